//! CLI Argument Parsing
//!
//! CLIの引数解析

use std::path::PathBuf;

use clap::Parser;

use crate::adapter::config::Config;

/// 決算書HTMLからEPSを抽出するHTTPサービス
#[derive(Parser, Debug, Clone)]
#[command(name = "filing-eps")]
#[command(about = "Extract EPS figures from filing HTML documents over HTTP", long_about = None)]
pub struct Args {
    /// Config file path (defaults are used when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen address, overrides `server.bind`
    #[arg(short, long)]
    pub bind: Option<String>,
}

impl Args {
    /// コマンドライン指定で設定を上書きする
    pub fn apply(&self, config: &mut Config) {
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
    }
}
