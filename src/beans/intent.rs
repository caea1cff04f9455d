/// 安装完成后需要启动的 Activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AndroidIntent {
    pub package_name: String,
    /// 组件名, 以 `.` 开头时相对于包名
    pub component_name: Option<String>,
    pub action: Option<String>,
    pub category: Option<String>,
    pub data_uri: Option<String>,
    pub flags: Option<String>,
    pub extra_args: Vec<String>,
    pub wait_for_debugger: bool,
}

impl AndroidIntent {
    pub fn new(package_name: &str) -> AndroidIntent {
        Self {
            package_name: package_name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_component(mut self, component_name: &str) -> Self {
        self.component_name = Some(component_name.to_string());
        self
    }

    pub fn with_action(mut self, action: &str) -> Self {
        self.action = Some(action.to_string());
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_data_uri(mut self, data_uri: &str) -> Self {
        self.data_uri = Some(data_uri.to_string());
        self
    }

    pub fn with_flags(mut self, flags: &str) -> Self {
        self.flags = Some(flags.to_string());
        self
    }

    pub fn with_extra_arg(mut self, arg: &str) -> Self {
        self.extra_args.push(arg.to_string());
        self
    }

    pub fn wait_for_debugger(mut self, wait: bool) -> Self {
        self.wait_for_debugger = wait;
        self
    }

    /// 生成 `am start` 命令行
    pub fn am_start_command(&self) -> String {
        let mut parts = vec!["am start".to_string()];
        if let Some(action) = &self.action {
            parts.push(format!("-a {}", action));
        }
        if let Some(category) = &self.category {
            parts.push(format!("-c {}", category));
        }
        if let Some(data_uri) = &self.data_uri {
            parts.push(format!("-d {}", data_uri));
        }
        if let Some(flags) = &self.flags {
            parts.push(format!("-f {}", flags));
        }
        if self.wait_for_debugger {
            parts.push("-D".to_string());
        }
        parts.extend(self.extra_args.iter().cloned());
        if let Some(component) = &self.component_name {
            parts.push(format!("-n {}/{}", self.package_name, component));
        } else if self.action.is_none() {
            parts.push(self.package_name.clone());
        }
        parts.join(" ")
    }
}
