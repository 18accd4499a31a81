//! Lists top-level window titles together with the owning process id.
//!
//! Linux goes through `wmctrl -lp` (EWMH window managers on X11 or
//! XWayland). Windows enumerates top-level windows directly. Anything else
//! has no backend and reports an error.

use anyhow::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowEntry {
    pub pid: u32,
    pub title: String,
}

#[cfg(target_os = "linux")]
pub fn list_windows() -> Result<Vec<WindowEntry>> {
    use anyhow::{bail, Context};
    use std::process::Command;

    let output = Command::new("wmctrl")
        .arg("-lp")
        .output()
        .context("failed to run wmctrl (is it installed?)")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("wmctrl -lp exited with {}: {}", output.status, stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(parse_wmctrl_line)
        .collect())
}

#[cfg(windows)]
pub fn list_windows() -> Result<Vec<WindowEntry>> {
    use anyhow::bail;
    use windows_sys::core::BOOL;
    use windows_sys::Win32::Foundation::{HWND, LPARAM};
    use windows_sys::Win32::UI::WindowsAndMessaging::{
        EnumWindows, GetWindowTextLengthW, GetWindowTextW, GetWindowThreadProcessId,
        IsWindowVisible,
    };

    unsafe extern "system" fn collect(hwnd: HWND, lparam: LPARAM) -> BOOL {
        let entries = &mut *(lparam as *mut Vec<WindowEntry>);
        if IsWindowVisible(hwnd) == 0 {
            return 1;
        }

        let len = GetWindowTextLengthW(hwnd);
        if len <= 0 {
            return 1;
        }

        let mut buffer = vec![0u16; len as usize + 1];
        let copied = GetWindowTextW(hwnd, buffer.as_mut_ptr(), buffer.len() as i32);
        if copied <= 0 {
            return 1;
        }

        let mut pid = 0u32;
        GetWindowThreadProcessId(hwnd, &mut pid);
        entries.push(WindowEntry {
            pid,
            title: String::from_utf16_lossy(&buffer[..copied as usize]),
        });
        1
    }

    let mut entries: Vec<WindowEntry> = Vec::new();
    let ok = unsafe { EnumWindows(Some(collect), &mut entries as *mut Vec<WindowEntry> as LPARAM) };
    if ok == 0 {
        bail!("EnumWindows failed: {}", std::io::Error::last_os_error());
    }
    Ok(entries)
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn list_windows() -> Result<Vec<WindowEntry>> {
    anyhow::bail!("window titles are not available on this platform")
}

/// Parses one `wmctrl -lp` line: `<window id> <desktop> <pid> <host> <title>`.
/// Windows without a known pid (reported as 0) are skipped.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
pub(crate) fn parse_wmctrl_line(line: &str) -> Option<WindowEntry> {
    let mut rest = line.trim_start();
    let mut fields = [""; 4];
    for field in fields.iter_mut() {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        *field = &rest[..end];
        rest = rest[end..].trim_start();
    }

    if !fields[0].starts_with("0x") {
        return None;
    }
    let pid: u32 = fields[2].parse().ok().filter(|pid| *pid != 0)?;

    Some(WindowEntry {
        pid,
        title: rest.trim_end().to_string(),
    })
}
