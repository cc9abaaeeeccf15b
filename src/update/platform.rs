use std::fmt;

/// Name of the language server executable, also the prefix of its release assets
pub const TOOL_NAME: &str = "pasls";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Os {
    Linux,
    Darwin,
    Windows,
    Other(String),
}

impl Os {
    /// Map a host OS identifier (`osx`, `linux`, `windows`) to a target.
    /// Unknown identifiers are kept as-is.
    pub fn from_host(id: &str) -> Self {
        match id {
            "osx" | "macos" => Self::Darwin,
            "linux" => Self::Linux,
            "windows" => Self::Windows,
            other => Self::Other(other.to_string()),
        }
    }

    /// The string release assets use for this OS
    pub fn canonical(&self) -> &str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Windows => "win64",
            Self::Other(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    I386,
    Aarch64,
    Other(String),
}

impl Arch {
    /// Map a host CPU identifier (`x64`, `x32`, `arm64`) to a target.
    /// Unknown identifiers are kept as-is.
    pub fn from_host(id: &str) -> Self {
        match id {
            "x64" | "x86_64" => Self::X86_64,
            "x32" | "x86" => Self::I386,
            "arm64" | "aarch64" => Self::Aarch64,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn canonical(&self) -> &str {
        match self {
            Self::X86_64 => "x86_64",
            Self::I386 => "i386",
            Self::Aarch64 => "aarch64",
            Self::Other(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformTarget {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformTarget {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    pub fn from_host(os_id: &str, arch_id: &str) -> Self {
        Self::new(Os::from_host(os_id), Arch::from_host(arch_id))
    }

    /// Target for the machine we are running on
    pub fn current() -> Self {
        Self::from_host(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    /// `pasls.exe` on Windows, `pasls` elsewhere
    pub fn binary_filename(&self) -> String {
        if self.is_windows() {
            format!("{}.exe", TOOL_NAME)
        } else {
            TOOL_NAME.to_string()
        }
    }
}

impl fmt::Display for PlatformTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os.canonical(), self.arch.canonical())
    }
}
