use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Yes/no question to the operator.
#[async_trait::async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, message: &str, default: bool) -> bool;
}

/// Asks on the terminal. Empty input or a closed stdin picks the default.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirm;

#[async_trait::async_trait]
impl Confirm for TerminalConfirm {
    async fn confirm(&self, message: &str, default: bool) -> bool {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        let mut stdout = io::stdout();
        if stdout
            .write_all(format!("{message} {hint} ").as_bytes())
            .await
            .is_err()
            || stdout.flush().await.is_err()
        {
            return default;
        }

        let mut line = String::new();
        match BufReader::new(io::stdin()).read_line(&mut line).await {
            Ok(0) | Err(_) => default,
            Ok(_) => parse_answer(&line).unwrap_or(default),
        }
    }
}

/// Answers every question with yes.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

#[async_trait::async_trait]
impl Confirm for AssumeYes {
    async fn confirm(&self, _message: &str, _default: bool) -> bool {
        true
    }
}

fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_answer;

    #[test]
    fn answers() {
        assert_eq!(parse_answer("Y\n"), Some(true));
        assert_eq!(parse_answer(" no "), Some(false));
        assert_eq!(parse_answer("\n"), None);
        assert_eq!(parse_answer("maybe"), None);
    }
}
