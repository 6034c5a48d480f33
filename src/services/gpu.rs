use std::fmt;
use std::process::Command;

/// Acceleration backend whisper.cpp can run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuAccel {
    Cuda,
    Rocm,
    Metal,
    Cpu,
}

/// Detected compute device, with a human-readable description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpuInfo {
    pub accel: GpuAccel,
    pub description: String,
}

impl fmt::Display for GpuInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// Probes the host for a usable accelerator.
///
/// Checks NVIDIA first, then ROCm, then Apple silicon; every probe failure
/// degrades to the next candidate and ultimately to plain CPU.
#[must_use]
pub fn detect() -> GpuInfo {
    if let Some(info) = detect_nvidia() {
        return info;
    }
    if let Some(info) = detect_rocm() {
        return info;
    }
    if let Some(info) = detect_apple() {
        return info;
    }
    GpuInfo { accel: GpuAccel::Cpu, description: "CPU (No GPU detected)".to_owned() }
}

fn detect_nvidia() -> Option<GpuInfo> {
    which::which("nvidia-smi").ok()?;
    let output = Command::new("nvidia-smi")
        .args(["--query-gpu=name", "--format=csv,noheader"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let name = stdout.lines().map(str::trim).find(|line| !line.is_empty())?;
    Some(GpuInfo { accel: GpuAccel::Cuda, description: format!("NVIDIA {name}") })
}

fn detect_rocm() -> Option<GpuInfo> {
    which::which("rocminfo").ok()?;
    let output = Command::new("rocminfo").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let name = stdout
        .lines()
        .filter(|line| line.contains("Marketing Name"))
        .filter(|line| line.contains("Radeon") || line.contains("AMD"))
        .filter_map(|line| line.rsplit(':').next())
        .map(str::trim)
        .find(|name| !name.is_empty());
    let description = match name {
        Some(name) => format!("AMD {name}"),
        None => "AMD GPU (ROCm)".to_owned(),
    };
    Some(GpuInfo { accel: GpuAccel::Rocm, description })
}

#[cfg(target_os = "macos")]
fn detect_apple() -> Option<GpuInfo> {
    let output = Command::new("sysctl").args(["-n", "machdep.cpu.brand_string"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let chip = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    if !chip.contains("Apple") {
        return None;
    }
    Some(GpuInfo { accel: GpuAccel::Metal, description: format!("Apple Metal ({chip})") })
}

#[cfg(not(target_os = "macos"))]
fn detect_apple() -> Option<GpuInfo> {
    None
}
