//! Scripted stand-in for the `incus` binary

use async_trait::async_trait;
use incus_backup::errors::CommandError;
use incus_backup::incus::{render_command, CommandRunner};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum Reply {
    /// Succeed with this stdout
    Output(String),
    /// Exit non-zero with this stderr
    Fail(String),
    /// Succeed after writing `size` bytes to the path found at `path_arg`
    WriteFile { path_arg: usize, size: usize },
    /// Succeed without writing anything
    Silent,
}

struct Rule {
    prefix: Vec<String>,
    reply: Reply,
    remaining: Option<usize>,
}

/// Records every invocation and answers with the first rule whose argument
/// prefix matches. Unmatched commands fail.
pub struct MockRunner {
    rules: Mutex<Vec<Rule>>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            rules: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer every matching command with `reply`
    pub fn on(self, prefix: &[&str], reply: Reply) -> Self {
        self.push_rule(prefix, reply, None)
    }

    /// Answer only the next matching command with `reply`
    pub fn once(self, prefix: &[&str], reply: Reply) -> Self {
        self.push_rule(prefix, reply, Some(1))
    }

    pub fn into_arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_matching(&self, prefix: &[&str]) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|call| matches_prefix(call, prefix))
            .collect()
    }

    fn push_rule(self, prefix: &[&str], reply: Reply, remaining: Option<usize>) -> Self {
        self.rules.lock().unwrap().push(Rule {
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            reply,
            remaining,
        });
        self
    }

    fn next_reply(&self, args: &[String]) -> Option<Reply> {
        let mut rules = self.rules.lock().unwrap();
        let rule = rules.iter_mut().find(|rule| {
            rule.remaining != Some(0)
                && args.len() >= rule.prefix.len()
                && args.iter().zip(&rule.prefix).all(|(a, p)| a == p)
        })?;

        if let Some(remaining) = rule.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(rule.reply.clone())
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        self.calls.lock().unwrap().push(args.to_vec());
        let command = render_command(program, args);

        match self.next_reply(args) {
            Some(Reply::Output(stdout)) => Ok(stdout),
            Some(Reply::Fail(message)) => Err(CommandError::Failed { command, message }),
            Some(Reply::WriteFile { path_arg, size }) => {
                std::fs::write(&args[path_arg], vec![0u8; size]).unwrap();
                Ok(String::new())
            }
            Some(Reply::Silent) => Ok(String::new()),
            None => Err(CommandError::Failed {
                command,
                message: "no scripted reply".to_string(),
            }),
        }
    }
}

fn matches_prefix(call: &[String], prefix: &[&str]) -> bool {
    call.len() >= prefix.len() && call.iter().zip(prefix).all(|(a, p)| a == p)
}
