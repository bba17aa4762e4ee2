// File: ./src/cli.rs
//! Command-line parsing and help text for the `eventdesk` binary.
use crate::model::{CategoryId, EventId, EventStatus, UserId, UserRole};
use crate::views::EventForm;
use anyhow::{Context, Result, anyhow, bail};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Config,
    Login {
        email: Option<String>,
    },
    Logout,
    Whoami,
    Register {
        email: String,
        role: UserRole,
        phone: Option<String>,
    },
    ForgotPassword {
        email: String,
    },
    ResetPassword {
        token: String,
    },
    /// `from`/`to` are local `YYYY-MM-DDTHH:MM` bounds on the start date.
    Events {
        name: Option<String>,
        status: Option<EventStatus>,
        from: Option<String>,
        to: Option<String>,
        page: u32,
    },
    EventShow(EventId),
    EventCreate(EventForm),
    /// Fields left `None` keep their current value.
    EventEdit {
        id: EventId,
        changes: EventChanges,
    },
    EventDelete(EventId),
    EventStart(EventId),
    EventStop(EventId),
    EventTimer(EventId),
    Categories {
        event_id: Option<EventId>,
        search: Option<String>,
        page: u32,
    },
    CategoryShow(CategoryId),
    CategoryCreate {
        event_id: EventId,
        name: String,
        description: Option<String>,
    },
    CategoryEdit {
        id: CategoryId,
        name: Option<String>,
        description: Option<String>,
    },
    CategoryDelete(CategoryId),
    Users,
    /// Admin-only; the current session is kept.
    UserCreate {
        email: String,
        role: UserRole,
        phone: Option<String>,
    },
    UserShow(UserId),
    UserEdit {
        id: UserId,
        email: Option<String>,
        phone: Option<String>,
        password: bool,
    },
    UserDelete(UserId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub timezone: Option<String>,
}

impl EventChanges {
    pub fn apply(self, form: &mut EventForm) {
        if let Some(v) = self.name {
            form.name = v;
        }
        if let Some(v) = self.description {
            form.description = v;
        }
        if let Some(v) = self.location {
            form.location = v;
        }
        if let Some(v) = self.start {
            form.start_local = v;
        }
        if let Some(v) = self.end {
            form.end_local = v;
        }
        if let Some(v) = self.timezone {
            form.timezone = Some(v);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub root: Option<PathBuf>,
    pub command: Command,
}

// Flags that take no value.
const SWITCHES: &[&str] = &["--password"];

/// `--key value` options plus positional words, in order.
#[derive(Debug, Default)]
struct Args {
    positional: Vec<String>,
    options: HashMap<String, String>,
    switches: Vec<String>,
}

impl Args {
    fn split(raw: &[String]) -> Result<Self> {
        let mut out = Args::default();
        let mut iter = raw.iter();
        while let Some(arg) = iter.next() {
            if SWITCHES.contains(&arg.as_str()) {
                out.switches.push(arg.clone());
            } else if let Some(key) = arg.strip_prefix("--") {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("Option '{}' needs a value", arg))?;
                out.options.insert(key.to_string(), value.clone());
            } else {
                out.positional.push(arg.clone());
            }
        }
        Ok(out)
    }

    fn take(&mut self, key: &str) -> Option<String> {
        self.options.remove(key)
    }

    fn require(&mut self, key: &str) -> Result<String> {
        self.take(key)
            .ok_or_else(|| anyhow!("Missing required option --{}", key))
    }

    fn switch(&self, name: &str) -> bool {
        self.switches.iter().any(|s| s == name)
    }

    fn id<T: std::str::FromStr>(&self, index: usize, what: &str) -> Result<T> {
        let raw = self
            .positional
            .get(index)
            .ok_or_else(|| anyhow!("Missing {} id", what))?;
        raw.parse()
            .map_err(|_| anyhow!("Invalid {} id '{}'", what, raw))
    }

    fn page(&mut self) -> Result<u32> {
        match self.take("page") {
            Some(p) => p.parse().with_context(|| format!("Invalid page '{}'", p)),
            None => Ok(1),
        }
    }

    /// `--role`, defaulting to OPERATOR.
    fn role(&mut self) -> Result<UserRole> {
        match self.take("role") {
            Some(r) => r
                .parse()
                .map_err(|_| anyhow!("Unknown role '{}' (ADMIN or OPERATOR)", r)),
            None => Ok(UserRole::Operator),
        }
    }

    fn finish(self) -> Result<()> {
        if let Some(key) = self.options.keys().next() {
            bail!("Unknown option --{}", key);
        }
        Ok(())
    }
}

/// Parses everything after the binary name.
pub fn parse_args(raw: &[String]) -> Result<Invocation> {
    let mut raw = raw.to_vec();
    let mut root = None;
    if let Some(pos) = raw.iter().position(|a| a == "--root" || a == "-r") {
        if pos + 1 >= raw.len() {
            bail!("--root needs a path");
        }
        root = Some(PathBuf::from(raw.remove(pos + 1)));
        raw.remove(pos);
    }

    if raw.is_empty() || raw.iter().any(|a| a == "--help" || a == "-h") {
        return Ok(Invocation {
            root,
            command: Command::Help,
        });
    }

    let mut args = Args::split(&raw)?;
    let words: Vec<String> = args.positional.drain(..args.positional.len().min(2)).collect();
    let verb = words.first().map(String::as_str).unwrap_or_default();
    let sub = words.get(1).map(String::as_str);

    // Ids after a two-word command now sit at positional index 0.
    let command = match (verb, sub) {
        ("help", _) => Command::Help,
        ("config", _) => Command::Config,
        ("login", _) => Command::Login {
            email: sub.map(str::to_string),
        },
        ("logout", _) => Command::Logout,
        ("whoami", _) => Command::Whoami,
        ("register", Some(email)) => Command::Register {
            email: email.to_string(),
            role: args.role()?,
            phone: args.take("phone"),
        },
        ("forgot-password", Some(email)) => Command::ForgotPassword {
            email: email.to_string(),
        },
        ("reset-password", Some(token)) => Command::ResetPassword {
            token: token.to_string(),
        },
        ("events", _) => Command::Events {
            name: args.take("name"),
            status: match args.take("status") {
                Some(s) => Some(
                    s.parse()
                        .map_err(|_| anyhow!("Unknown status '{}'", s))?,
                ),
                None => None,
            },
            from: args.take("from"),
            to: args.take("to"),
            page: args.page()?,
        },
        ("event", Some("create")) => Command::EventCreate(EventForm {
            name: args.require("name")?,
            start_local: args.require("start")?,
            end_local: args.require("end")?,
            description: args.take("description").unwrap_or_default(),
            location: args.take("location").unwrap_or_default(),
            timezone: args.take("timezone"),
        }),
        ("event", Some("show")) => Command::EventShow(args.id(0, "event")?),
        ("event", Some("edit")) => Command::EventEdit {
            id: args.id(0, "event")?,
            changes: EventChanges {
                name: args.take("name"),
                description: args.take("description"),
                location: args.take("location"),
                start: args.take("start"),
                end: args.take("end"),
                timezone: args.take("timezone"),
            },
        },
        ("event", Some("delete")) => Command::EventDelete(args.id(0, "event")?),
        ("event", Some("start")) => Command::EventStart(args.id(0, "event")?),
        ("event", Some("stop")) => Command::EventStop(args.id(0, "event")?),
        ("event", Some("timer")) => Command::EventTimer(args.id(0, "event")?),
        ("categories", _) => Command::Categories {
            event_id: match args.take("event") {
                Some(id) => Some(id.parse().map_err(|_| anyhow!("Invalid event id '{}'", id))?),
                None => None,
            },
            search: args.take("search"),
            page: args.page()?,
        },
        ("category", Some("show")) => Command::CategoryShow(args.id(0, "category")?),
        ("category", Some("create")) => {
            let event = args.require("event")?;
            Command::CategoryCreate {
                event_id: event
                    .parse()
                    .map_err(|_| anyhow!("Invalid event id '{}'", event))?,
                name: args.require("name")?,
                description: args.take("description"),
            }
        }
        ("category", Some("edit")) => Command::CategoryEdit {
            id: args.id(0, "category")?,
            name: args.take("name"),
            description: args.take("description"),
        },
        ("category", Some("delete")) => Command::CategoryDelete(args.id(0, "category")?),
        ("users", _) => Command::Users,
        ("user", Some("create")) => Command::UserCreate {
            email: args.require("email")?,
            role: args.role()?,
            phone: args.take("phone"),
        },
        ("user", Some("show")) => Command::UserShow(args.id(0, "user")?),
        ("user", Some("edit")) => Command::UserEdit {
            id: args.id(0, "user")?,
            email: args.take("email"),
            phone: args.take("phone"),
            password: args.switch("--password"),
        },
        ("user", Some("delete")) => Command::UserDelete(args.id(0, "user")?),
        ("event" | "category" | "user", _) => {
            bail!("Unknown or missing subcommand for '{}'", verb)
        }
        ("register" | "forgot-password" | "reset-password", None) => {
            bail!("'{}' needs an argument, see 'eventdesk help'", verb)
        }
        _ => bail!("Unknown command '{}', see 'eventdesk help'", verb),
    };

    args.finish()?;
    Ok(Invocation { root, command })
}

pub fn print_help(binary_name: &str) {
    println!(
        "Eventdesk v{} - Command-line admin client for the event backend",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} [--root <path>] <command> [options]", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("SESSION:");
    println!("    login [email]                          Sign in (password is prompted)");
    println!("    logout                                 Sign out");
    println!("    whoami                                 Show the signed-in user");
    println!("    register <email> [--role ADMIN|OPERATOR] [--phone <n>]");
    println!("    forgot-password <email>                Send a reset link");
    println!("    reset-password <token>                 Choose a new password");
    println!();
    println!("EVENTS:");
    println!("    events [--name <s>] [--status <S>] [--from <t>] [--to <t>] [--page <n>]");
    println!("    event show <id>");
    println!("    event create --name <s> --start <t> --end <t> [--description <s>]");
    println!("                 [--location <s>] [--timezone <zone>]");
    println!("    event edit <id> [--name ..] [--start ..] [--end ..] [--timezone ..]");
    println!("    event delete <id>");
    println!("    event start <id>                       DRAFT/PUBLISHED -> ONGOING");
    println!("    event stop <id>                        ONGOING -> COMPLETED");
    println!("    event timer <id>                       Live elapsed time (Ctrl-C to leave)");
    println!();
    println!("CATEGORIES:");
    println!("    categories [--event <id>] [--search <s>] [--page <n>]");
    println!("    category show|delete <id>");
    println!("    category create --event <id> --name <s> [--description <s>]");
    println!("    category edit <id> [--name <s>] [--description <s>]");
    println!();
    println!("USERS (admin):");
    println!("    users");
    println!("    user create --email <s> [--role ADMIN|OPERATOR] [--phone <n>]");
    println!("    user show|delete <id>");
    println!("    user edit <id> [--email <s>] [--phone <s>] [--password]");
    println!();
    println!("OTHER:");
    println!("    config                                 Show the config file location and values");
    println!("    help                                   Show this help message");
    println!();
    println!("DATES:");
    println!("    Times are local wall-clock times (YYYY-MM-DDTHH:MM) read in --timezone,");
    println!("    else the configured timezone, else $TZ, else UTC.");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Invocation> {
        let raw: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        parse_args(&raw)
    }

    #[test]
    fn test_root_flag_anywhere() {
        let inv = parse("event show 7 --root /tmp/ed").unwrap();
        assert_eq!(inv.root, Some(PathBuf::from("/tmp/ed")));
        assert_eq!(inv.command, Command::EventShow(7));
    }

    #[test]
    fn test_event_create() {
        let inv = parse(
            "event create --name Gala --start 2025-05-01T18:00 --end 2025-05-01T23:00 --timezone Europe/Paris",
        )
        .unwrap();
        match inv.command {
            Command::EventCreate(form) => {
                assert_eq!(form.name, "Gala");
                assert_eq!(form.end_local, "2025-05-01T23:00");
                assert_eq!(form.timezone.as_deref(), Some("Europe/Paris"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_events_filter() {
        let inv = parse("events --status ongoing --page 2").unwrap();
        assert_eq!(
            inv.command,
            Command::Events {
                name: None,
                status: Some(EventStatus::Ongoing),
                from: None,
                to: None,
                page: 2
            }
        );
        let inv = parse("events --from 2025-03-01T00:00 --to 2025-03-31T23:59").unwrap();
        assert!(matches!(
            inv.command,
            Command::Events { from: Some(f), to: Some(t), .. }
                if f == "2025-03-01T00:00" && t == "2025-03-31T23:59"
        ));
    }

    #[test]
    fn test_errors() {
        assert!(parse("event show").is_err());
        assert!(parse("event show abc").is_err());
        assert!(parse("event fly 3").is_err());
        assert!(parse("events --bogus 1").is_err());
        assert!(parse("event create --name x").is_err());
        assert_eq!(parse("").unwrap().command, Command::Help);
    }

    #[test]
    fn test_user_create_defaults_to_operator() {
        let inv = parse("user create --email op@example.com").unwrap();
        assert_eq!(
            inv.command,
            Command::UserCreate {
                email: "op@example.com".to_string(),
                role: UserRole::Operator,
                phone: None,
            }
        );
        assert!(parse("user create --email a@b.c --role boss").is_err());
    }

    #[test]
    fn test_user_edit_password_switch() {
        let inv = parse("user edit 4 --password --phone 555").unwrap();
        assert_eq!(
            inv.command,
            Command::UserEdit {
                id: 4,
                email: None,
                phone: Some("555".to_string()),
                password: true
            }
        );
    }
}
