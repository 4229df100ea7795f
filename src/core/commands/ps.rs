//! Fabricated process table for `ps`.
//!
//! Purely decorative. A handful of system daemons are always listed; `-a`
//! (and `aux`, `-ef`) reveal a set of suspicious processes as well.

struct Process<'a> {
    pid: u32,
    user: &'a str,
    cpu: f32,
    mem: f32,
    vsz: u32,
    rss: u32,
    tty: &'a str,
    stat: &'a str,
    start: &'a str,
    time: &'a str,
    command: String,
}

impl<'a> Process<'a> {
    #[allow(clippy::too_many_arguments)]
    fn row(
        pid: u32,
        user: &'a str,
        cpu: f32,
        mem: f32,
        vsz: u32,
        rss: u32,
        tty: &'a str,
        stat: &'a str,
        start: &'a str,
        time: &'a str,
        command: String,
    ) -> Self {
        Self {
            pid,
            user,
            cpu,
            mem,
            vsz,
            rss,
            tty,
            stat,
            start,
            time,
            command,
        }
    }

    /// Executable base name (`/usr/sbin/sshd -D` -> `sshd`).
    fn short_command(&self) -> &str {
        let program = self.command.split(' ').next().unwrap_or_default();
        program.rsplit('/').next().unwrap_or(program)
    }
}

/// Output style selected by the flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Flags {
    show_all: bool,
    user_format: bool,
    full_format: bool,
}

impl Flags {
    fn parse(args: &[String]) -> Self {
        let mut flags = Self::default();
        for arg in args {
            match arg.as_str() {
                "aux" | "-aux" => {
                    flags.show_all = true;
                    flags.user_format = true;
                    flags.full_format = true;
                }
                "a" | "-a" => flags.show_all = true,
                "u" | "-u" => flags.user_format = true,
                "x" | "-x" => flags.full_format = true,
                "ef" | "-ef" => {
                    flags.show_all = true;
                    flags.full_format = true;
                }
                _ => {}
            }
        }
        flags
    }
}

/// Render the table for `ps <args>` as seen by `current_user`.
pub fn render(args: &[String], current_user: &str) -> String {
    let flags = Flags::parse(args);
    let processes = process_table(args, current_user, flags.show_all);

    let mut lines = Vec::with_capacity(processes.len() + 1);
    if flags.user_format {
        lines.push(
            "USER       PID %CPU %MEM    VSZ   RSS TTY      STAT START   TIME COMMAND".to_string(),
        );
        lines.extend(processes.iter().map(|p| {
            format!(
                "{:<10} {:>4} {:>4.1} {:>4.1} {:>6} {:>5} {:<8} {:<4} {:<5} {:>6} {}",
                p.user, p.pid, p.cpu, p.mem, p.vsz, p.rss, p.tty, p.stat, p.start, p.time, p.command
            )
        }));
    } else if flags.full_format {
        lines.push("  PID TTY      STAT   TIME COMMAND".to_string());
        lines.extend(processes.iter().map(|p| {
            format!(
                "{:>5} {:<8} {:<4} {:>6} {}",
                p.pid, p.tty, p.stat, p.time, p.command
            )
        }));
    } else {
        lines.push("  PID TTY          TIME CMD".to_string());
        lines.extend(
            processes
                .iter()
                .filter(|p| p.user == current_user || p.tty.starts_with("pts"))
                .map(|p| format!("{:>5} {:<12} {:>8} {}", p.pid, p.tty, p.time, p.short_command())),
        );
    }
    lines.join("\n")
}

fn process_table<'a>(args: &[String], current_user: &'a str, show_all: bool) -> Vec<Process<'a>> {
    let cmd = |s: &str| s.to_string();
    let mut processes = vec![
        Process::row(1, "root", 0.0, 0.1, 169420, 13452, "?", "Ss", "10:15", "0:01", cmd("/sbin/init")),
        Process::row(234, "root", 0.0, 0.2, 71256, 6234, "?", "S<s", "10:15", "0:00", cmd("[kthreadd]")),
        Process::row(512, "root", 0.1, 0.3, 284712, 15236, "?", "Ssl", "10:15", "0:02", cmd("/usr/sbin/sshd -D")),
        Process::row(1024, "root", 0.0, 0.5, 445672, 28491, "?", "Ss", "10:15", "0:01", cmd("/usr/sbin/nginx -g daemon off;")),
    ];

    if show_all {
        processes.extend([
            Process::row(666, "root", 12.3, 8.7, 2456789, 445123, "?", "R", "10:16", "15:42", cmd("/usr/bin/.hidden/cryptominer --pool=darkpool.onion")),
            Process::row(1337, "kmitnick", 0.3, 2.1, 892341, 108234, "?", "S", "10:17", "0:23", cmd("./backdoor.sh --listen 31337")),
            Process::row(2600, "root", 0.8, 3.4, 1234567, 176234, "?", "Ss", "10:18", "1:12", cmd("/opt/trojan/keylogger -o /tmp/.logs")),
            Process::row(3133, "nobody", 1.2, 1.8, 734521, 92341, "?", "R", "10:19", "2:34", cmd("python3 /tmp/botnet_client.py")),
            Process::row(4096, "www-data", 0.2, 0.9, 456789, 45123, "?", "S", "10:20", "0:08", cmd("/bin/bash /var/www/.shell/reverse.sh")),
            Process::row(5555, "root", 15.6, 12.3, 3456789, 623451, "?", "R", "09:23", "45:17", cmd("/usr/sbin/mimikatz --dump-creds")),
            Process::row(6969, "kmitnick", 0.1, 0.4, 234567, 23456, "pts/0", "S", "11:42", "0:00", cmd("nc -lvp 4444 -e /bin/bash")),
        ]);
    }

    processes.push(Process::row(7891, current_user, 0.0, 0.3, 123456, 12345, "pts/1", "Ss", "10:22", "0:00", cmd("-bash")));
    processes.push(Process::row(
        7892,
        current_user,
        0.0,
        0.1,
        45678,
        2345,
        "pts/1",
        "R+",
        "10:23",
        "0:00",
        format!("ps {}", args.join(" ")).trim_end().to_string(),
    ));

    processes.sort_by_key(|p| p.pid);
    processes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(strs: &[&str]) -> Vec<String> {
        strs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_minimal_format_shows_session_processes() {
        let out = render(&[], "user");
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0], "  PID TTY          TIME CMD");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], " 7891 pts/1            0:00 -bash");
        assert_eq!(lines[2], " 7892 pts/1            0:00 ps");
    }

    #[test]
    fn test_minimal_format_as_root_includes_daemons() {
        let out = render(&[], "root");
        assert!(out.contains("sshd"));
        assert!(out.contains("    1 ?"));
    }

    #[test]
    fn test_aux_format() {
        let out = render(&args(&["aux"]), "user");
        let lines: Vec<_> = out.lines().collect();
        assert!(lines[0].starts_with("USER       PID %CPU"));
        assert_eq!(lines.len(), 1 + 4 + 7 + 2);
        assert!(out.contains("mimikatz"));
        assert!(lines.last().unwrap().ends_with("ps aux"));
    }

    #[test]
    fn test_aux_row_layout() {
        let out = render(&args(&["aux"]), "user");
        let init = out.lines().nth(1).unwrap();
        assert_eq!(
            init,
            "root          1  0.0  0.1 169420 13452 ?        Ss   10:15   0:01 /sbin/init"
        );
    }

    #[test]
    fn test_ef_format_sorted_by_pid() {
        let out = render(&args(&["-ef"]), "user");
        let pids: Vec<u32> = out
            .lines()
            .skip(1)
            .map(|line| line.split_whitespace().next().unwrap().parse().unwrap())
            .collect();
        let mut sorted = pids.clone();
        sorted.sort();
        assert_eq!(pids, sorted);
        assert!(out.starts_with("  PID TTY      STAT   TIME COMMAND"));
    }

    #[test]
    fn test_short_command() {
        let p = Process::row(1, "root", 0.0, 0.0, 0, 0, "?", "S", "", "", "/usr/sbin/sshd -D".to_string());
        assert_eq!(p.short_command(), "sshd");
    }
}
