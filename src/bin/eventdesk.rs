use anyhow::{Context, Result, bail};
use chrono_tz::Tz;
use eventdesk::auth::{Auth, AuthError};
use eventdesk::cli::{self, Command};
use eventdesk::client::{ApiClient, ApiError};
use eventdesk::config::Config;
use eventdesk::context::{AppContext, SharedContext, StandardContext};
use eventdesk::lifecycle::{EventAction, GuardError, TimerGate};
use eventdesk::logging;
use eventdesk::model::{
    Category, CategoryFilter, CreateCategoryRequest, Event, RegisterRequest, UpdateCategoryRequest,
    UpdateUserRequest, User, UserPatch, UserRole,
};
use eventdesk::notify::{Notifier, Severity, Subscription};
use eventdesk::routes::{Navigator, Route};
use eventdesk::session::{Access, SessionStore};
use eventdesk::timezone;
use eventdesk::views::{
    CreateEventForm, DetailView, EditState, EditView, EventListView, TimerView, ViewContext,
    ViewError,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

struct App {
    ctx: SharedContext,
    config: Config,
    zone: Tz,
    auth: Auth,
    notifier: Notifier,
    navigator: Navigator,
    routes: UnboundedReceiver<Route>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let invocation = match cli::parse_args(&args) {
        Ok(inv) => inv,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            eprintln!("Run 'eventdesk help' for usage.");
            std::process::exit(2);
        }
    };
    if invocation.command == Command::Help {
        cli::print_help("eventdesk");
        return Ok(());
    }

    let ctx: SharedContext = Arc::new(StandardContext::new(invocation.root));
    let config = Config::load_or_default(ctx.as_ref())?;
    if let Err(e) = logging::init(ctx.as_ref(), config.log_level_filter()) {
        eprintln!("warning: logging disabled: {:#}", e);
    }
    let zone = timezone::resolve_zone(config.timezone.as_deref())?;

    let notifier = Notifier::new();
    let (navigator, routes) = Navigator::channel();
    let client = ApiClient::new(&config.base_url(), None, config.request_timeout())?;
    let auth = Auth::new(
        client,
        SessionStore::new(ctx.as_ref())?,
        notifier.clone(),
        navigator.clone(),
    );
    let mut toasts = notifier.subscribe();

    let mut app = App {
        ctx,
        config,
        zone,
        auth,
        notifier,
        navigator,
        routes,
    };

    let result = app.run(invocation.command).await;
    if let Err(e) = &result
        && is_unauthorized(e)
    {
        app.auth.handle_unauthorized();
    }
    flush_toasts(&mut toasts);

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            // View errors were already shown as notifications.
            if e.downcast_ref::<ViewError>().is_none() {
                eprintln!("Error: {:#}", e);
            }
            log::error!("Command failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn is_unauthorized(err: &anyhow::Error) -> bool {
    if let Some(e) = err.downcast_ref::<ApiError>() {
        return e.is_unauthorized();
    }
    if let Some(AuthError::Api(e)) = err.downcast_ref::<AuthError>() {
        return e.is_unauthorized();
    }
    err.downcast_ref::<ViewError>()
        .and_then(ViewError::api)
        .is_some_and(ApiError::is_unauthorized)
}

fn flush_toasts(toasts: &mut Subscription) {
    for toast in toasts.drain() {
        match toast.severity {
            Severity::Success | Severity::Info => eprintln!("{}", toast.message),
            _ => eprintln!("{}: {}", toast.severity, toast.message),
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(&format!("{} [y/N] ", question))?;
    Ok(matches!(answer.as_str(), "y" | "Y" | "yes"))
}

fn new_password() -> Result<(String, String)> {
    let password = rpassword::prompt_password("New password: ")?;
    let confirmation = rpassword::prompt_password("Repeat password: ")?;
    Ok((password, confirmation))
}

impl App {
    fn require(&self, roles: &[UserRole]) -> Result<()> {
        match self.auth.session().authorize(roles) {
            Access::Granted => Ok(()),
            Access::Redirect(Route::Login) => {
                bail!("Not signed in. Run 'eventdesk login' first.")
            }
            Access::Redirect(_) => bail!("This command needs one of the roles: {:?}", roles),
        }
    }

    fn views(&self) -> ViewContext<ApiClient> {
        ViewContext::new(
            Arc::new(self.auth.client().clone()),
            self.notifier.clone(),
            self.navigator.clone(),
            self.zone.name(),
        )
        .configured(&self.config)
    }

    fn date(&self, instant: chrono::DateTime<chrono::Utc>, local: Option<&str>) -> String {
        timezone::display_date(instant, local, self.zone)
    }

    async fn run(&mut self, command: Command) -> Result<()> {
        let staff = [UserRole::Admin, UserRole::Operator];
        match command {
            Command::Help => cli::print_help("eventdesk"),
            Command::Config => self.show_config()?,
            Command::Login { email } => {
                let email = match email {
                    Some(e) => e,
                    None => prompt("Email: ")?,
                };
                let password = rpassword::prompt_password("Password: ")?;
                let user = self.auth.login(&email, &password).await?;
                println!("Signed in as {} ({})", user.email, user.role);
            }
            Command::Logout => {
                self.auth.logout().await;
                println!("Signed out.");
            }
            Command::Whoami => match self.auth.check_auth().await {
                Some(user) => print_user(&user),
                None => println!("Not signed in."),
            },
            Command::Register { email, role, phone } => {
                let (password, confirmation) = new_password()?;
                let data = RegisterRequest {
                    email,
                    password,
                    phone,
                    role,
                };
                let user = self.auth.register(data, &confirmation).await?;
                println!("Registered and signed in as {} ({})", user.email, user.role);
            }
            Command::ForgotPassword { email } => self.auth.forgot_password(&email).await?,
            Command::ResetPassword { token } => {
                let (password, confirmation) = new_password()?;
                self.auth
                    .reset_password(&token, &password, &confirmation)
                    .await?;
            }
            Command::Events {
                name,
                status,
                from,
                to,
                page,
            } => {
                self.require(&staff)?;
                let zone = self.zone;
                let bound = |input: Option<String>| {
                    input
                        .map(|t| timezone::local_input_to_utc(&t, zone))
                        .transpose()
                };
                let (from, to) = (bound(from)?, bound(to)?);
                let mut view = EventListView::new(self.views(), self.config.page_size);
                view.set_filter(name, status, from, to);
                view.set_page(page);
                view.load().await?;
                self.print_events(&view);
            }
            Command::EventShow(id) => {
                self.require(&staff)?;
                let mut view = DetailView::new(self.views(), id);
                view.load().await?;
                if let Some(event) = view.event() {
                    self.print_event(event);
                    let p = view.permissions();
                    let actions: Vec<&str> = [
                        (p.editable, "edit"),
                        (p.can_start, "start"),
                        (p.can_stop, "stop"),
                        (p.can_view_timer, "timer"),
                    ]
                    .into_iter()
                    .filter_map(|(ok, name)| ok.then_some(name))
                    .collect();
                    if !actions.is_empty() {
                        println!("Actions:     {}", actions.join(", "));
                    }
                }
            }
            Command::EventCreate(form) => {
                self.require(&staff)?;
                let event = CreateEventForm::new(self.views()).submit(&form).await?;
                println!("Created event #{}", event.id);
            }
            Command::EventEdit { id, changes } => {
                self.require(&staff)?;
                let mut view = EditView::new(self.views(), id);
                match view.open().await? {
                    EditState::Blocked { details, .. } => {
                        println!("See 'eventdesk event show {}' ({}).", id, details);
                    }
                    EditState::Form(mut form) => {
                        changes.apply(&mut form);
                        let event = view.submit(&form).await?;
                        self.print_event(&event);
                    }
                }
            }
            Command::EventDelete(id) => {
                self.require(&staff)?;
                if confirm(&format!("Delete event #{}?", id))? {
                    let mut view = EventListView::new(self.views(), self.config.page_size);
                    view.delete(id).await?;
                }
            }
            Command::EventStart(id) => {
                self.require(&staff)?;
                let mut view = DetailView::new(self.views(), id);
                view.load().await?;
                view.start().await?;
                println!("Follow it with 'eventdesk event timer {}'.", id);
            }
            Command::EventStop(id) => {
                self.require(&staff)?;
                let mut view = TimerView::new(self.views(), id);
                if view.activate().await? == TimerGate::Run {
                    let event = view.stop().await?;
                    println!("Stopped after {}", view.reading().text);
                    self.print_event(&event);
                } else if let Some(event) = view.event() {
                    bail!(GuardError::NotPermitted {
                        action: EventAction::Stop,
                        status: event.status,
                    });
                }
            }
            Command::EventTimer(id) => {
                self.require(&staff)?;
                self.run_timer(id).await?;
            }
            Command::Categories {
                event_id,
                search,
                page,
            } => {
                self.require(&staff)?;
                let filter = CategoryFilter {
                    page: Some(page),
                    limit: Some(self.config.page_size),
                    event_id,
                    search,
                };
                let page = self.auth.client().list_categories(&filter).await?;
                for category in &page.data {
                    print_category_row(category);
                }
                println!(
                    "Page {}/{} ({} categories)",
                    page.page,
                    page.total_pages.max(1),
                    page.total
                );
            }
            Command::CategoryShow(id) => {
                self.require(&staff)?;
                let category = self.auth.client().get_category(id).await?;
                print_category(&category);
            }
            Command::CategoryCreate {
                event_id,
                name,
                description,
            } => {
                self.require(&staff)?;
                let data = CreateCategoryRequest {
                    event_id,
                    name,
                    description,
                };
                let category = self.auth.client().create_category(&data).await?;
                self.notifier.success("Category created successfully!");
                print_category(&category);
            }
            Command::CategoryEdit {
                id,
                name,
                description,
            } => {
                self.require(&staff)?;
                let data = UpdateCategoryRequest { name, description };
                let category = self.auth.client().update_category(id, &data).await?;
                self.notifier.success("Category updated successfully!");
                print_category(&category);
            }
            Command::CategoryDelete(id) => {
                self.require(&staff)?;
                if confirm(&format!("Delete category #{}?", id))? {
                    self.auth.client().delete_category(id).await?;
                    self.notifier.success("Category deleted successfully!");
                }
            }
            Command::Users => {
                self.require(&[UserRole::Admin])?;
                for user in self.auth.client().list_users().await? {
                    println!(
                        "{:>5}  {:<9} {:<8} {}",
                        user.id, user.role, user.status, user.email
                    );
                }
            }
            Command::UserCreate { email, role, phone } => {
                self.require(&[UserRole::Admin])?;
                let (password, confirmation) = new_password()?;
                let data = RegisterRequest {
                    email,
                    password,
                    phone,
                    role,
                };
                let user = self.auth.create_user(data, &confirmation).await?;
                println!("Created user #{} {} ({})", user.id, user.email, user.role);
            }
            Command::UserShow(id) => {
                self.require(&[UserRole::Admin])?;
                print_user(&self.auth.client().get_user(id).await?);
            }
            Command::UserEdit {
                id,
                email,
                phone,
                password,
            } => {
                self.require(&[UserRole::Admin])?;
                let password = if password {
                    let (p, c) = new_password()?;
                    eventdesk::auth::check_new_password(&p, &c)?;
                    Some(p)
                } else {
                    None
                };
                let data = UpdateUserRequest {
                    email,
                    phone,
                    password,
                };
                let user = self.auth.client().update_user(id, &data).await?;
                if self.auth.session().user.as_ref().is_some_and(|u| u.id == id) {
                    self.auth.update_user(UserPatch {
                        email: Some(user.email.clone()),
                        phone: user.phone.clone(),
                        ..Default::default()
                    });
                }
                self.notifier.success("User updated successfully!");
                print_user(&user);
            }
            Command::UserDelete(id) => {
                self.require(&[UserRole::Admin])?;
                if confirm(&format!("Delete user #{}?", id))? {
                    self.auth.client().delete_user(id).await?;
                    self.notifier.success("User deleted successfully!");
                }
            }
        }
        self.drain_routes();
        Ok(())
    }

    /// Renders the live timer until the event leaves ONGOING or Ctrl-C.
    async fn run_timer(&mut self, id: i64) -> Result<()> {
        let mut view = TimerView::new(self.views(), id);
        if let TimerGate::Leave(_) = view.activate().await? {
            let status = view.event().map(|e| e.status.to_string()).unwrap_or_default();
            println!("Event #{} is {}, not running.", id, status);
            self.drain_routes();
            return Ok(());
        }
        self.drain_routes();
        if let Some(event) = view.event() {
            println!(
                "{} (started {})",
                event.name,
                self.date(event.start_date, event.start_date_local.as_deref())
            );
        }

        let mut readings = view.subscribe();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        print!("\r  {}  ", readings.borrow_and_update().text);
        io::stdout().flush()?;

        loop {
            tokio::select! {
                changed = readings.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    print!("\r  {}  ", readings.borrow_and_update().text);
                    io::stdout().flush()?;
                }
                route = self.routes.recv() => {
                    if let Some(Route::EventDetail(_)) = route {
                        println!();
                        let status = view.event().map(|e| e.status.to_string()).unwrap_or_default();
                        println!("Event is now {}.", status);
                        break;
                    }
                }
                _ = &mut ctrl_c => {
                    println!();
                    break;
                }
            }
        }
        view.deactivate();
        Ok(())
    }

    fn drain_routes(&mut self) {
        while let Ok(route) = self.routes.try_recv() {
            log::debug!("route request {} (cli: ignored)", route);
        }
    }

    fn show_config(&self) -> Result<()> {
        let path = Config::get_path_string(self.ctx.as_ref())?;
        println!("Config file: {}", path);
        println!("Log file:    {}", self.ctx.get_log_path()?.display());
        println!("Timezone:    {}", self.zone.name());
        println!();
        print!(
            "{}",
            toml::to_string_pretty(&self.config).context("Failed to render config")?
        );
        Ok(())
    }

    fn print_events(&self, view: &EventListView<ApiClient>) {
        for event in view.rows() {
            println!(
                "{:>5} {} {:<10} {}  {}",
                event.id,
                event.status.symbol(),
                event.status,
                self.date(event.start_date, event.start_date_local.as_deref()),
                event.name
            );
        }
        if let Some(page) = view.page() {
            println!(
                "Page {}/{} ({} events)",
                page.page,
                page.total_pages.max(1),
                page.total
            );
        }
    }

    fn print_event(&self, event: &Event) {
        println!("#{} {}", event.id, event.name);
        println!("Status:      {}", event.status);
        println!(
            "Starts:      {}",
            self.date(event.start_date, event.start_date_local.as_deref())
        );
        println!(
            "Ends:        {}",
            self.date(event.end_date, event.end_date_local.as_deref())
        );
        if let Some(location) = &event.location {
            println!("Location:    {}", location);
        }
        if let Some(tz) = &event.timezone {
            println!("Timezone:    {}", tz);
        }
        if let Some(description) = &event.description {
            println!();
            println!("{}", description);
        }
    }
}

fn print_category_row(category: &Category) {
    let event = category
        .event
        .as_ref()
        .map_or_else(|| format!("event #{}", category.event_id), |e| e.name.clone());
    println!("{:>5}  {:<24} {}", category.id, category.name, event);
}

fn print_category(category: &Category) {
    println!("#{} {}", category.id, category.name);
    match &category.event {
        Some(event) => println!("Event:       {} (#{})", event.name, event.id),
        None => println!("Event:       #{}", category.event_id),
    }
    if let Some(description) = &category.description {
        println!("{}", description);
    }
}

fn print_user(user: &User) {
    println!("#{} {}", user.id, user.email);
    println!("Role:        {}", user.role);
    println!("Status:      {}", user.status);
    if let Some(phone) = &user.phone {
        println!("Phone:       {}", phone);
    }
}
