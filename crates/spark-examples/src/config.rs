//! `pub_thr` 的位置参数解析。
//!
//! 参数形如 `[<payload-size>=256] [<path>=/test/thr] [<locator>=auto]`，
//! 首个参数为 `-h`/`--help` 时只输出使用说明。

/// 默认负载字节数。
pub const DEFAULT_PAYLOAD_SIZE: usize = 256;
/// 默认资源路径。
pub const DEFAULT_PATH: &str = "/test/thr";

/// 吞吐示例的运行配置。
///
/// - `payload_size`：每条消息的负载字节数；非数字参数按 0 处理，不做额外校验；
/// - `path`：声明资源使用的路径；
/// - `locator`：会话定位符，`None` 表示自动发现。
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PubThrConfig {
    pub payload_size: usize,
    pub path: String,
    pub locator: Option<String>,
}

impl Default for PubThrConfig {
    fn default() -> Self {
        Self {
            payload_size: DEFAULT_PAYLOAD_SIZE,
            path: DEFAULT_PATH.to_owned(),
            locator: None,
        }
    }
}

/// 一次命令行调用的解析结果。
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Invocation {
    /// 输出使用说明后以状态码 0 退出。
    Help,
    /// 按配置运行吞吐测试。
    Run(PubThrConfig),
}

impl Invocation {
    /// 解析不含程序名的参数序列。
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let mut config = PubThrConfig::default();

        if let Some(first) = args.first().map(AsRef::as_ref) {
            if first == "-h" || first == "--help" {
                return Invocation::Help;
            }
            config.payload_size = parse_size(first);
        }
        if let Some(path) = args.get(1) {
            config.path = path.as_ref().to_owned();
        }
        if let Some(locator) = args.get(2).map(AsRef::as_ref) {
            if locator != "auto" {
                config.locator = Some(locator.to_owned());
            }
        }
        Invocation::Run(config)
    }
}

/// 使用说明文本。
pub fn usage() -> String {
    format!(
        "USAGE:\n\tpub_thr [<payload-size>={DEFAULT_PAYLOAD_SIZE}] [<path>={DEFAULT_PATH}] [<locator>=auto]\n"
    )
}

/// 取前导数字解析负载长度，无数字时为 0。
fn parse_size(raw: &str) -> usize {
    let trimmed = raw.trim_start();
    let digits = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed, |end| &trimmed[..end]);
    digits.parse().unwrap_or(0)
}
