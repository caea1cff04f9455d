/// 传给 adb 的一条命令.
///
/// `Line` 是一整行命令文本, 作为 shell 命令时原样交给设备端 shell 解释 (可以包含管道和重定向);
/// `Args` 是已经拆分好的参数列表, 参数中可以含有空格 (例如本地文件路径).
#[derive(Ord, PartialOrd, Eq, PartialEq, Debug, Clone)]
pub enum AdbCommand {
    Args(Vec<String>),
    Line(String),
}

impl AdbCommand {
    /// 用于日志和错误信息的可读形式
    pub fn get_command(&self) -> String {
        match self {
            AdbCommand::Args(args) => args.join(" "),
            AdbCommand::Line(line) => line.clone(),
        }
    }

    /// 作为 adb 子命令执行时的参数列表
    pub fn to_args(&self) -> Vec<String> {
        match self {
            AdbCommand::Args(args) => args.clone(),
            AdbCommand::Line(line) => line.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// 作为 `adb shell` 的命令行, 参数会按设备端 shell 的规则转义
    pub fn to_shell_line(&self) -> String {
        match self {
            AdbCommand::Args(args) => args
                .iter()
                .map(|arg| quote_arg(arg))
                .collect::<Vec<String>>()
                .join(" "),
            AdbCommand::Line(line) => line.clone(),
        }
    }
}

fn quote_arg(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@,+%".contains(c));
    if plain {
        return arg.to_string();
    }
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('\'');
    for c in arg.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

impl From<&str> for AdbCommand {
    fn from(value: &str) -> Self {
        AdbCommand::Line(value.to_string())
    }
}

impl From<String> for AdbCommand {
    fn from(value: String) -> Self {
        AdbCommand::Line(value)
    }
}

impl From<&[&str]> for AdbCommand {
    fn from(value: &[&str]) -> Self {
        AdbCommand::Args(value.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<&[&str; N]> for AdbCommand {
    fn from(value: &[&str; N]) -> Self {
        AdbCommand::Args(value.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<String>> for AdbCommand {
    fn from(value: Vec<String>) -> Self {
        AdbCommand::Args(value)
    }
}
