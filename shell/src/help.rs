pub struct CommandHelp {
    pub name: &'static str,
    pub summary: &'static str,
    pub usage: &'static str,
    pub options: &'static [(&'static str, &'static str)],
}

pub const COMMANDS: &[CommandHelp] = &[
    CommandHelp {
        name: "help",
        summary: "Show the command list or the usage of one command",
        usage: "help [COMMAND]",
        options: &[],
    },
    CommandHelp {
        name: "info",
        summary: "Show capacity and limits of the file store",
        usage: "info",
        options: &[],
    },
    CommandHelp {
        name: "mkdir",
        summary: "Make a directory; its parent must exist",
        usage: "mkdir [PATH/]NAME",
        options: &[],
    },
    CommandHelp {
        name: "rmdir",
        summary: "Remove an empty directory outside the work directory",
        usage: "rmdir [PATH/]NAME",
        options: &[],
    },
    CommandHelp {
        name: "dir",
        summary: "List directory content",
        usage: "dir [PATH[/PATTERN]]",
        options: &[("?", "Matches one character"), ("*", "Matches more characters")],
    },
    CommandHelp {
        name: "tree",
        summary: "Show the directory tree",
        usage: "tree [PATH]",
        options: &[],
    },
    CommandHelp {
        name: "cd",
        summary: "Change the work directory",
        usage: "cd PATH",
        options: &[],
    },
    CommandHelp {
        name: "type",
        summary: "Print file content",
        usage: "type [PATH/]FILE [hex]",
        options: &[("hex", "Print as a hexadecimal dump")],
    },
    CommandHelp {
        name: "load",
        summary: "Create a file from pasted terminal input",
        usage: "load [PATH/]FILE [bin]",
        options: &[
            ("^", "Stands for a line break in text mode"),
            ("Ctrl-D", "Ends text input"),
            ("bin", "Store bytes unchanged; input ends when it pauses"),
        ],
    },
    CommandHelp {
        name: "del",
        summary: "Delete a file, or every file matching a pattern",
        usage: "del [PATH][/PATTERN]",
        options: &[("?", "Matches one character"), ("*", "Matches more characters")],
    },
    CommandHelp {
        name: "ren",
        summary: "Rename or move a file",
        usage: "ren [PATH/]FROM [PATH/]TO",
        options: &[],
    },
    CommandHelp {
        name: "copy",
        summary: "Copy a file, or every file matching a pattern into a directory",
        usage: "copy [PATH][/PATTERN] [PATH][/TO]",
        options: &[("?", "Matches one character"), ("*", "Matches more characters")],
    },
    CommandHelp {
        name: "exit",
        summary: "Leave the shell (Ctrl-D works too)",
        usage: "exit",
        options: &[],
    },
    CommandHelp {
        name: "format",
        summary: "Erase all content of the file store",
        usage: "format",
        options: &[],
    },
    CommandHelp {
        name: "begin",
        summary: "Mount the file store",
        usage: "begin",
        options: &[],
    },
    CommandHelp {
        name: "end",
        summary: "Unmount the file store",
        usage: "end",
        options: &[],
    },
];

pub fn get_help(name: &str) -> Option<&'static CommandHelp> {
    COMMANDS.iter().find(|c| c.name == name)
}

pub fn format_help(cmd: &CommandHelp) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} - {}\n\n", cmd.name, cmd.summary));
    out.push_str(&format!("Usage: {}\n", cmd.usage));
    if !cmd.options.is_empty() {
        out.push_str("\nOptions:\n");
        for (opt, desc) in cmd.options {
            out.push_str(&format!("  {opt:16} {desc}\n"));
        }
    }
    out
}

pub fn format_help_list() -> String {
    let mut out = String::new();
    out.push_str("lfsh - command line file manager\n\n");
    out.push_str("Commands are case-sensitive. Paths are relative to the work directory\n");
    out.push_str("unless they start with '/'. Up and down arrows recall the last ten lines.\n\n");
    out.push_str("Available commands:\n\n");

    for cmd in COMMANDS {
        out.push_str(&format!("  {:12} {}\n", cmd.name, cmd.summary));
    }

    out.push_str("\nUse 'help COMMAND' for more information.\n");
    out
}
