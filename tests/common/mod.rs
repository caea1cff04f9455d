#![allow(dead_code)]

use exodevice::{AdbBridge, AdbCommand, AdbError, AdbResult};
use std::cell::RefCell;
use std::path::Path;

/// 一次被记录下来的 adb 调用
#[derive(Debug, Clone)]
pub struct Call {
    pub shell: bool,
    pub args: Vec<String>,
    pub line: String,
    /// push 命令执行时本地源路径是否存在
    pub source_existed: Option<bool>,
}

impl Call {
    pub fn display(&self) -> String {
        if self.shell {
            format!("shell {}", self.line)
        } else {
            self.line.clone()
        }
    }
}

enum Reply {
    Output(String),
    Fail(String),
}

struct Rule {
    shell: bool,
    pattern: String,
    reply: Reply,
    remaining: Option<usize>,
}

/// 按规则返回结果的 adb 桥, 记录所有调用, 不需要真实设备.
/// 规则按添加顺序匹配命令文本中的子串, 没有匹配的命令返回空输出.
#[derive(Default)]
pub struct ScriptedBridge {
    rules: RefCell<Vec<Rule>>,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shell_ok(self, pattern: &str, output: &str) -> Self {
        self.rule(true, pattern, Reply::Output(output.to_string()), None)
    }

    pub fn shell_fail(self, pattern: &str, message: &str) -> Self {
        self.rule(true, pattern, Reply::Fail(message.to_string()), None)
    }

    pub fn adb_ok(self, pattern: &str, output: &str) -> Self {
        self.rule(false, pattern, Reply::Output(output.to_string()), None)
    }

    pub fn adb_fail(self, pattern: &str, message: &str) -> Self {
        self.rule(false, pattern, Reply::Fail(message.to_string()), None)
    }

    /// 只生效一次的失败规则
    pub fn adb_fail_once(self, pattern: &str, message: &str) -> Self {
        self.rule(false, pattern, Reply::Fail(message.to_string()), Some(1))
    }

    fn rule(self, shell: bool, pattern: &str, reply: Reply, remaining: Option<usize>) -> Self {
        self.rules.borrow_mut().push(Rule {
            shell,
            pattern: pattern.to_string(),
            reply,
            remaining,
        });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls.borrow().iter().map(Call::display).collect()
    }

    pub fn count_matching(&self, pattern: &str) -> usize {
        self.commands().iter().filter(|c| c.contains(pattern)).count()
    }

    pub fn pushes(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| !c.shell && c.args.first().map(String::as_str) == Some("push"))
            .cloned()
            .collect()
    }
}

impl AdbBridge for ScriptedBridge {
    fn execute(
        &self,
        _serial: &str,
        command: &AdbCommand,
        shell: bool,
        ignore_failure: bool,
    ) -> AdbResult<String> {
        let args = command.to_args();
        let line = command.get_command();
        let source_existed = if !shell && args.first().map(String::as_str) == Some("push") {
            args.len()
                .checked_sub(2)
                .map(|i| Path::new(&args[i]).exists())
        } else {
            None
        };
        self.calls.borrow_mut().push(Call {
            shell,
            args,
            line: line.clone(),
            source_existed,
        });

        let mut rules = self.rules.borrow_mut();
        let matched = rules.iter_mut().find(|r| {
            r.shell == shell && line.contains(&r.pattern) && r.remaining != Some(0)
        });
        let Some(rule) = matched else {
            return Ok(String::new());
        };
        if let Some(remaining) = rule.remaining.as_mut() {
            *remaining -= 1;
        }
        match &rule.reply {
            Reply::Output(output) => Ok(output.trim().to_string()),
            Reply::Fail(message) if ignore_failure => Ok(message.clone()),
            Reply::Fail(message) => Err(AdbError::command_failed(line, message.clone())),
        }
    }
}
