use serde::Serialize;
use std::fmt;

/// Build and platform information printed by `--version`.
#[derive(Debug, Clone, Serialize)]
pub struct Info {
    pub version: &'static str,
    pub git_commit: &'static str,
    pub build_date: &'static str,
    pub platform: String,
}

pub fn get() -> Info {
    Info {
        version: env!("CARGO_PKG_VERSION"),
        git_commit: option_env!("CMDR_GIT_COMMIT").unwrap_or("unknown"),
        build_date: option_env!("CMDR_BUILD_DATE").unwrap_or("unknown"),
        platform: format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
    }
}

impl fmt::Display for Info {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Version: v{}\nGit Commit: {}\nBuild Date: {}\nPlatform: {}",
            self.version, self.git_commit, self.build_date, self.platform
        )
    }
}
