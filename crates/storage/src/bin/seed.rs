use std::fmt;

use exam_core::model::{
    DepartmentId, ExamBlueprint, ExamId, OptionIndex, Question, QuestionId,
};
use storage::repository::{
    DepartmentRecord, DepartmentRepository, ExamRepository, QuestionRepository, Storage,
};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    questions_per_exam: u32,
    duration_seconds: u32,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidQuestions { raw: String },
    InvalidDuration { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidQuestions { raw } => write!(f, "invalid --questions value: {raw}"),
            ArgsError::InvalidDuration { raw } => write!(f, "invalid --duration value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("EXAM_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut questions_per_exam = std::env::var("EXAM_QUESTIONS")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(5);
        let mut duration_seconds = 1_800;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--questions" => {
                    let value = require_value(&mut args, "--questions")?;
                    questions_per_exam = value
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or(ArgsError::InvalidQuestions { raw: value })?;
                }
                "--duration" => {
                    let value = require_value(&mut args, "--duration")?;
                    duration_seconds = value
                        .parse::<u32>()
                        .ok()
                        .filter(|n| *n > 0)
                        .ok_or(ArgsError::InvalidDuration { raw: value })?;
                }
                other => return Err(ArgsError::UnknownArg(other.to_string())),
            }
        }

        Ok(Self {
            db_url,
            questions_per_exam,
            duration_seconds,
        })
    }
}

fn sample_question(exam: u64, ordinal: u64) -> Question {
    let id = QuestionId::new(exam * 1_000 + ordinal);
    // rotate the correct option so seeded exams are not trivially guessable
    let correct = OptionIndex::new(u8::try_from(ordinal % 4).unwrap_or(0))
        .expect("ordinal % 4 is always in range");
    Question::new(
        id,
        format!("Sample question {ordinal} for exam {exam}"),
        Some(format!("नमूना प्रश्न {ordinal}")),
        [
            format!("Option A for question {ordinal}"),
            format!("Option B for question {ordinal}"),
            format!("Option C for question {ordinal}"),
            format!("Option D for question {ordinal}"),
        ],
        correct,
    )
    .expect("sample question is valid")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse()?;

    let storage = Storage::sqlite(&args.db_url).await?;

    let departments = [
        DepartmentRecord {
            id: DepartmentId::new(1),
            name: "Computer Science".into(),
        },
        DepartmentRecord {
            id: DepartmentId::new(2),
            name: "Electrical Engineering".into(),
        },
    ];

    let mut exams_seeded = 0u32;
    let mut questions_seeded = 0u32;

    for department in &departments {
        storage.departments.upsert_department(department).await?;

        let exam_id = ExamId::new(department.id.value());
        let blueprint = ExamBlueprint::new(
            exam_id,
            department.id,
            format!("{} Entrance Exam", department.name),
            args.duration_seconds,
            args.questions_per_exam,
        )?;
        storage.exams.upsert_exam(&blueprint).await?;
        exams_seeded += 1;

        for ordinal in 0..u64::from(args.questions_per_exam) {
            let question = sample_question(exam_id.value(), ordinal + 1);
            let position = u32::try_from(ordinal)?;
            storage
                .questions
                .upsert_question(exam_id, position, &question)
                .await?;
            questions_seeded += 1;
        }
    }

    println!(
        "seeded {} departments, {exams_seeded} exams, {questions_seeded} questions into {}",
        departments.len(),
        args.db_url
    );
    Ok(())
}
