use std::time::Duration;

use sensorama::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Question flow
// ---------------------------------------------------------------------------

fn sample_options() -> Vec<QuizOption> {
    vec![
        QuizOption::new(1, "Opção #1", false),
        QuizOption::new(2, "Opção #2", false),
        QuizOption::new(3, "Opção #3", true),
        QuizOption::new(4, "Opção #4", false),
    ]
}

/// Plays one question: the "player" picks `choice` after `think`, unless
/// the clock runs out first.
async fn play_question(
    mut question: TimedQuestion,
    choice: u32,
    think: Duration,
) -> Result<Outcome, SensoramaError> {
    tokio::select! {
        outcome = question.expired() => Ok(outcome),
        _ = tokio::time::sleep(think) => {
            question.select(choice);
            match question.submit()? {
                SubmitResult::Revealed(outcome) => Ok(outcome),
                SubmitResult::Advance => Ok(question.round().outcome()),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let session_file =
        std::env::var("SENSORAMA_SESSION").unwrap_or_else(|_| "sensorama-session.json".into());
    let app = SensoramaBuilder::new().build(FileStore::new(&session_file))?;
    app.start().await;

    let mut guard = app.guard();
    if let GuardDecision::Blocked { redirect } = guard.ready().await {
        let (Ok(user), Ok(password)) = (
            std::env::var("SENSORAMA_USER"),
            std::env::var("SENSORAMA_PASSWORD"),
        ) else {
            eprintln!(
                "not logged in (would redirect to {}); set SENSORAMA_USER and SENSORAMA_PASSWORD",
                redirect.as_deref().unwrap_or(guard.redirect_target())
            );
            return Ok(());
        };
        let signed_in = app.sign_in(&user, &password).await?;
        eprintln!("signed in as {}", signed_in.user.username);
        if let Some(name) = signed_in.profile.and_then(|p| p.name) {
            eprintln!("welcome back, {name}");
        }
    }

    eprintln!("spinning the wheel...");
    let spin = app.spin_wheel().await?;
    eprintln!(
        "landed on {} after {:.2} turns -> {}",
        spin.segment.name,
        spin.total_rotation(),
        app.route_for(&spin)
    );

    let question = app.start_question(sample_options())?;
    let outcome = play_question(question, 3, Duration::from_secs(4)).await?;
    eprintln!("answer: {outcome:?}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> TimedQuestion {
        TimedQuestion::start(
            sensorama::quiz::QuestionRound::with_limit(sample_options(), Duration::from_secs(15))
                .unwrap(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_question_answer_in_time_is_scored() {
        let outcome = play_question(question(), 3, Duration::from_secs(4)).await.unwrap();
        assert_eq!(outcome, Outcome::Correct);
    }

    #[tokio::test(start_paused = true)]
    async fn test_play_question_slow_answer_times_out() {
        let outcome = play_question(question(), 3, Duration::from_secs(30)).await.unwrap();
        assert_eq!(outcome, Outcome::Unanswered);
    }
}
