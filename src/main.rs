use std::io::stdin;

use clap::Parser;
use ecg_quicktest::{factory, telemetry};

#[derive(Parser)]
struct Args {
    /// マトリクスバージョン（省略時は既定のバージョン）
    #[arg(long)]
    matrix_version: Option<String>,
    /// 回答者区分
    #[arg(long)]
    participant_type: Option<String>,
    #[arg(long, default_value = "warn")]
    log_level: String,
}

enum Input {
    Answer(u8),
    Back,
    Quit,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    telemetry::init(&args.log_level)?;

    let mut test = factory(args.matrix_version.as_deref())?;
    if let Some(ref participant_type) = args.participant_type {
        test.set_participant_type(participant_type)?;
    }
    let allowed = test.rule_set().allowed_answers().to_vec();
    println!("{} {}", test, test.participant_type());
    println!("回答は {:?} のいずれか、b で前の設問、q で終了", allowed);

    let mut buffer = String::new();
    let mut current = test.next_question(0);
    while let Some(question) = current {
        let question = u32::try_from(question)?;
        match test.answer(question) {
            Some(value) => println!("設問 {} [{}]", question, value),
            None => println!("設問 {}", question),
        }

        buffer.clear();
        if stdin().read_line(&mut buffer)? == 0 {
            break;
        }
        match parse_input(buffer.trim()) {
            Some(Input::Answer(value)) => match test.set_answer(question, value) {
                Ok(()) => current = test.next_question(i64::from(question)),
                Err(_) => println!("回答は {:?} のいずれかで入力してください。", allowed),
            },
            Some(Input::Back) => {
                // 0 is the position before the first question
                if let Some(previous) = test
                    .previous_question(i64::from(question))
                    .filter(|&previous| previous > 0)
                {
                    current = Some(previous);
                }
            }
            Some(Input::Quit) => break,
            None => println!("回答は {:?} のいずれかで入力してください。", allowed),
        }
        println!();
    }

    let result = test.result();
    println!(
        "得点 {} / {}（{}%）、段階 {}",
        result.points,
        test.max_points(),
        result.percentage,
        u8::from(result.level)
    );
    if !test.is_complete() {
        println!("回答済みは {}% です。", test.percentage_finished());
    }
    Ok(())
}

fn parse_input(value: &str) -> Option<Input> {
    match value {
        "b" => Some(Input::Back),
        "q" => Some(Input::Quit),
        value => value.parse::<u8>().ok().map(Input::Answer),
    }
}
