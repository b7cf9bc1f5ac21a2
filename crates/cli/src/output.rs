//! Plain-text rendering of agent results

use chrono::DateTime;

use files::{FileInfo, ProcessInfo, SystemInfo};

/// One line per entry, in the order given
pub fn format_listing(files: &[FileInfo]) -> String {
    let mut out = String::new();
    for file in files {
        let kind = if file.is_directory { 'd' } else { '-' };
        let size = if file.is_directory {
            "-".to_string()
        } else {
            file.size.to_string()
        };
        out.push_str(&format!(
            "{}{:<9} {:>10}  {}  {}\n",
            kind,
            file.permissions,
            size,
            format_timestamp(file.modified),
            file.name
        ));
    }
    out
}

pub fn format_timestamp(secs: i64) -> String {
    DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| secs.to_string())
}

pub fn format_system_info(info: &SystemInfo) -> String {
    let hours = info.uptime / 3600;
    let minutes = (info.uptime % 3600) / 60;
    format!(
        "Host: {}\n  CPU: {:.1}%\n  Memory: {:.1}%\n  Disk: {:.1}%\n  Uptime: {}h {}m\n  Processes: {}\n",
        info.hostname, info.cpu, info.memory, info.disk, hours, minutes, info.processes
    )
}

pub fn format_processes(processes: &[ProcessInfo]) -> String {
    let mut out = format!("{:>7}  {:>6}  {:>10}  {:<10} {}\n", "PID", "CPU%", "MEM", "STATUS", "NAME");
    for p in processes {
        out.push_str(&format!(
            "{:>7}  {:>6.1}  {:>10}  {:<10} {}\n",
            p.pid, p.cpu, p.memory, p.status, p.name
        ));
    }
    out
}
