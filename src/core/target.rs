//! Target platform identity.
//!
//! Discovery and validation both depend on the operating system, CPU
//! architecture and ABI of the platform being targeted. The host platform is
//! the default; tests and `harbour-libc check --target` use parsed triples to
//! simulate other platforms.

use std::fmt;

/// Operating system component of a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Os {
    Linux,
    Windows,
    /// macOS and the other Darwin-based systems.
    Darwin,
    FreeBsd,
    NetBsd,
    DragonFly,
    Other(String),
}

impl Os {
    /// Parse the OS component of a triple or `std::env::consts::OS`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "linux" => Os::Linux,
            "windows" => Os::Windows,
            "macos" | "darwin" | "ios" | "tvos" | "watchos" => Os::Darwin,
            "freebsd" => Os::FreeBsd,
            "netbsd" => Os::NetBsd,
            "dragonfly" => Os::DragonFly,
            other => Os::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Os::Linux => "linux",
            Os::Windows => "windows",
            Os::Darwin => "darwin",
            Os::FreeBsd => "freebsd",
            Os::NetBsd => "netbsd",
            Os::DragonFly => "dragonfly",
            Os::Other(name) => name,
        }
    }
}

/// CPU architecture component of a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arch {
    X86,
    X86_64,
    Arm,
    Aarch64,
    Other(String),
}

impl Arch {
    pub fn from_name(name: &str) -> Self {
        match name {
            "x86" | "i386" | "i486" | "i586" | "i686" => Arch::X86,
            "x86_64" | "amd64" => Arch::X86_64,
            "arm" | "armv7" | "armv7a" | "thumbv7a" => Arch::Arm,
            "aarch64" | "arm64" => Arch::Aarch64,
            other => Arch::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
            Arch::Arm => "arm",
            Arch::Aarch64 => "aarch64",
            Arch::Other(name) => name,
        }
    }
}

/// ABI / environment component of a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Abi {
    /// GNU-style toolchain (gnu, gnueabi, gnueabihf, gnux32, ...).
    Gnu,
    Msvc,
    Musl,
    None,
    Other(String),
}

impl Abi {
    pub fn from_name(name: &str) -> Self {
        match name {
            "" | "none" => Abi::None,
            "msvc" => Abi::Msvc,
            n if n.starts_with("musl") => Abi::Musl,
            n if n.starts_with("gnu") => Abi::Gnu,
            other => Abi::Other(other.to_string()),
        }
    }

    /// Whether this is one of the GNU-style ABIs.
    pub fn is_gnu(&self) -> bool {
        matches!(self, Abi::Gnu)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Abi::Gnu => "gnu",
            Abi::Msvc => "msvc",
            Abi::Musl => "musl",
            Abi::None => "none",
            Abi::Other(name) => name,
        }
    }
}

/// The platform a libc installation is discovered or validated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub arch: Arch,
    pub os: Os,
    pub abi: Abi,
}

impl Target {
    /// Create a new target.
    pub fn new(arch: Arch, os: Os, abi: Abi) -> Self {
        Target { arch, os, abi }
    }

    /// Detect the host target.
    pub fn host() -> Self {
        let arch = Arch::from_name(std::env::consts::ARCH);
        let os = Os::from_name(std::env::consts::OS);

        let abi = if cfg!(target_env = "msvc") {
            Abi::Msvc
        } else if cfg!(target_env = "gnu") {
            Abi::Gnu
        } else if cfg!(target_env = "musl") {
            Abi::Musl
        } else {
            Abi::None
        };

        Target::new(arch, os, abi)
    }

    /// Parse a target triple such as `x86_64-pc-windows-msvc` or
    /// `aarch64-unknown-linux-gnu`.
    ///
    /// The vendor component is optional for three-part triples whose last
    /// component is a known ABI (`x86_64-linux-gnu`).
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split('-').collect();
        let (arch, os, abi) = match parts.as_slice() {
            [arch, _vendor, os, abi] => (*arch, *os, *abi),
            [arch, os, abi] if is_abi_name(abi) => (*arch, *os, *abi),
            [arch, _vendor, os] => (*arch, *os, ""),
            _ => return None,
        };

        if arch.is_empty() || os.is_empty() {
            return None;
        }

        Some(Target::new(
            Arch::from_name(arch),
            Os::from_name(os),
            Abi::from_name(abi),
        ))
    }

    /// Whether the target is Windows with an MSVC-style (non-GNU) ABI.
    pub fn is_windows_msvc(&self) -> bool {
        self.os == Os::Windows && !self.abi.is_gnu()
    }

    /// Whether the target is Darwin.
    pub fn is_darwin(&self) -> bool {
        self.os == Os::Darwin
    }
}

fn is_abi_name(name: &str) -> bool {
    !matches!(Abi::from_name(name), Abi::Other(_))
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.abi {
            Abi::None => write!(f, "{}-{}", self.arch.as_str(), self.os.as_str()),
            _ => write!(
                f,
                "{}-{}-{}",
                self.arch.as_str(),
                self.os.as_str(),
                self.abi.as_str()
            ),
        }
    }
}
