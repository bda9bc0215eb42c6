//! Command execution.
//!
//! [`App`] owns the catalog and turns each parsed [`Command`] into output
//! text: a table in `text` mode, the matching records otherwise.

use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use towerdex_catalog::{
    Booster, Card, Catalog, Chip, FeatureSuggestion, InMemoryAuth, InMemoryBackend, NewBooster,
    NewReport, Report, Turret, User,
};
use towerdex_query::{Record, View};
use tracing::{debug, info};

use crate::api::Api;
use crate::cli::{ApiArgs, Command, Screen};
use crate::config::{Config, Operator};
use crate::debounce::SearchDebouncer;
use crate::output::{OutputDestination, OutputMode};
use crate::screens::{BoosterFilters, CardFilters, ChipFilters, ReportFilters, TurretFilters};
use crate::serialize::serialize_structured;
use crate::table::{self, Tabular};

/// A running session: one catalog, acting as the configured operator.
#[derive(Debug, Clone)]
pub struct App {
    catalog: Catalog,
    config: Config,
    output: OutputMode,
}

impl App {
    /// Seeds the in-memory backend and signs the operator in.
    pub async fn start(config: Config, output: OutputMode) -> Result<App> {
        Self::start_with_auth(config, output, InMemoryAuth::new()).await
    }

    pub async fn start_with_auth(
        config: Config,
        output: OutputMode,
        auth: InMemoryAuth,
    ) -> Result<App> {
        let backend = Arc::new(InMemoryBackend::seeded().context("loading game data")?);
        let user = sign_in(&auth, &config.operator)
            .await
            .with_context(|| format!("signing in as {}", config.operator.email))?;
        debug!(user = %user.id, role = ?user.role, "operator signed in");

        let catalog = Catalog::new(backend, Arc::new(auth), config.cache);
        Ok(App::new(catalog, config, output))
    }

    pub fn new(catalog: Catalog, config: Config, output: OutputMode) -> App {
        App {
            catalog,
            config,
            output,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Runs `command`, writing its output to `destination`.
    pub async fn run(&self, command: Command, destination: &OutputDestination) -> Result<()> {
        if let Command::Browse(args) = &command {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            return self.browse_into(args.screen, stdin, destination).await;
        }
        let text = self.execute(command).await?;
        destination
            .write_text(&text)
            .context("writing command output")
    }

    /// Runs a non-interactive command and returns its output.
    pub async fn execute(&self, command: Command) -> Result<String> {
        match command {
            Command::Cards(args) => self.cards(args.into()).await,
            Command::Chips(args) => self.chips(args.into()).await,
            Command::Turrets(args) => self.turrets(args.into()).await,
            Command::Boosters(args) => self.boosters(args.into()).await,
            Command::Reports(args) => {
                let mine = args.mine;
                self.reports(args.into(), mine).await
            }
            Command::Features(args) => {
                let features = self.catalog.features().await?;
                let query = crate::screens::FeatureFilters::from(args).query();
                self.render_view(&query.run(features.iter(), FeatureSuggestion::accessor))
            }
            Command::Report(args) => {
                let report = self
                    .catalog
                    .create_report(NewReport {
                        title: args.title,
                        description: args.description,
                        kind: args.kind,
                    })
                    .await?;
                self.render_record(&report, || format!("submitted report {}", report.id))
            }
            Command::AddBooster(args) => {
                let booster = self
                    .catalog
                    .create_booster(NewBooster {
                        discord_name: args.discord_name,
                        discord_nickname: args.nickname,
                        game_id: args.game_id,
                        active: !args.inactive,
                    })
                    .await?;
                self.render_record(&booster, || {
                    format!("added booster {}", booster.discord_name)
                })
            }
            Command::Upvote(args) if args.report => {
                let report = self.catalog.upvote_report(&args.id).await?;
                self.render_record(&report, || {
                    format!("report {} now has {} votes", report.id, report.votes)
                })
            }
            Command::Upvote(args) => {
                let feature = self.catalog.upvote_feature(&args.id).await?;
                self.render_record(&feature, || {
                    format!("'{}' now has {} votes", feature.title, feature.votes)
                })
            }
            Command::Api(args) => self.api(args).await,
            Command::Browse(_) => bail!("browse reads search text from standard input"),
        }
    }

    pub async fn cards(&self, filters: CardFilters) -> Result<String> {
        let cards = self.catalog.cards().await?;
        self.render_view(&filters.query().run(cards.iter(), Card::accessor))
    }

    pub async fn chips(&self, filters: ChipFilters) -> Result<String> {
        let chips = self.catalog.chips().await?;
        let tower_types = self.catalog.tower_types().await?;
        self.render_view(&filters.query(tower_types).run(chips.iter(), Chip::accessor))
    }

    pub async fn turrets(&self, filters: TurretFilters) -> Result<String> {
        let turrets = self.catalog.turrets().await?;
        self.render_view(&filters.query().run(turrets.iter(), Turret::accessor))
    }

    pub async fn boosters(&self, filters: BoosterFilters) -> Result<String> {
        let boosters = self.catalog.boosters().await?;
        let page_size = self.config.booster_page_size;
        let view = filters.query(page_size).run(boosters.iter(), Booster::accessor);
        let mut out = self.render_view(&view)?;
        if !self.output.is_structured() {
            out.push_str(&format!(
                "page {} of {}\n",
                filters.page.max(1),
                view.page_count(page_size).max(1)
            ));
        }
        Ok(out)
    }

    pub async fn reports(&self, filters: ReportFilters, mine: bool) -> Result<String> {
        let reports = if mine {
            self.catalog.my_reports().await?
        } else {
            self.catalog.all_reports().await?
        };
        self.render_view(&filters.query().run(reports.iter(), Report::accessor))
    }

    async fn api(&self, args: ApiArgs) -> Result<String> {
        let api = Api::new(self.catalog.clone());
        let Some(response) = api.handle(&args.method, &args.target).await else {
            bail!("'{}' is not an API path (expected /api/...)", args.target);
        };
        if self.output.is_structured() {
            return Ok(serialize_structured(&response, self.output)?);
        }
        let body = serde_json::to_string_pretty(&response.body)?;
        Ok(format!("{} {}\n{}\n", response.status, response.content_type, body))
    }

    /// Reads search text line by line and re-renders `screen` once typing
    /// pauses for the configured quiet interval. End of input applies any
    /// pending text immediately.
    /// Runs [`browse`](Self::browse) with every render written to
    /// `destination`.
    pub async fn browse_into<R>(
        &self,
        screen: Screen,
        input: R,
        destination: &OutputDestination,
    ) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut out = destination.writer().context("opening browse output")?;
        self.browse(screen, input, &mut out).await?;
        out.flush().context("writing browse output")
    }

    pub async fn browse<R, W>(&self, screen: Screen, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        let mut debouncer = SearchDebouncer::new(self.config.search_debounce());
        let mut open = true;

        writeln!(out, "{}", self.screen(screen, debouncer.applied()).await?)?;
        while open {
            let deadline = debouncer.deadline();
            let wake = deadline
                .map(tokio::time::Instant::from_std)
                .unwrap_or_else(tokio::time::Instant::now);

            let applied = tokio::select! {
                line = lines.next_line() => match line? {
                    Some(text) => {
                        debouncer.input(text.trim(), Instant::now());
                        None
                    }
                    None => {
                        open = false;
                        debouncer.flush().map(str::to_string)
                    }
                },
                _ = tokio::time::sleep_until(wake), if deadline.is_some() => {
                    debouncer.poll(Instant::now()).map(str::to_string)
                }
            };

            if let Some(search) = applied {
                info!(screen = ?screen, %search, "search changed");
                writeln!(out, "{}", self.screen(screen, &search).await?)?;
            }
        }
        Ok(())
    }

    async fn screen(&self, screen: Screen, search: &str) -> Result<String> {
        let search = Some(search.to_string()).filter(|s| !s.is_empty());
        match screen {
            Screen::Cards => {
                self.cards(CardFilters {
                    search,
                    ..CardFilters::default()
                })
                .await
            }
            Screen::Chips => {
                self.chips(ChipFilters {
                    search,
                    ..ChipFilters::default()
                })
                .await
            }
            Screen::Turrets => {
                self.turrets(TurretFilters {
                    search,
                    ..TurretFilters::default()
                })
                .await
            }
            Screen::Boosters => {
                self.boosters(BoosterFilters {
                    search,
                    ..BoosterFilters::default()
                })
                .await
            }
        }
    }

    fn render_view<T>(&self, view: &View<'_, T>) -> Result<String>
    where
        T: Tabular + Serialize,
    {
        if self.output.is_structured() {
            return Ok(serialize_structured(&view.records(), self.output)?);
        }

        let mut out = String::new();
        match view.groups() {
            Some(groups) => {
                for group in groups {
                    out.push_str(&format!("[{}]\n", group.label));
                    out.push_str(&table::render(&group.records));
                    out.push('\n');
                }
            }
            None => out.push_str(&table::render(&view.records())),
        }
        out.push_str(&format!(
            "{} shown, {} matched, {} total\n",
            view.len(),
            view.matched,
            view.total
        ));
        Ok(out)
    }

    fn render_record<T: Serialize>(
        &self,
        record: &T,
        summary: impl FnOnce() -> String,
    ) -> Result<String> {
        if self.output.is_structured() {
            return Ok(serialize_structured(record, self.output)?);
        }
        Ok(summary() + "\n")
    }
}

async fn sign_in(auth: &InMemoryAuth, operator: &Operator) -> towerdex_catalog::Result<User> {
    use towerdex_catalog::Authenticate as _;

    // The operator account lives only for this process.
    let password = uuid::Uuid::new_v4().to_string();
    auth.register(&operator.email, &password, operator.role).await?;
    auth.login(&operator.email, &password).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{Algorithm, Argon2, Params, Version};
    use towerdex_catalog::{CardType, CatalogError, Role};

    fn fast_auth() -> InMemoryAuth {
        let params = Params::new(256, 1, 1, None).unwrap();
        InMemoryAuth::with_hasher(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    async fn app_as(role: Role, output: OutputMode) -> App {
        let config = Config {
            operator: Operator {
                email: "op@example.com".into(),
                role,
            },
            ..Config::default()
        };
        App::start_with_auth(config, output, fast_auth()).await.unwrap()
    }

    #[tokio::test]
    async fn card_table_lists_matches_and_counts() {
        let app = app_as(Role::Member, OutputMode::Text).await;
        let out = app
            .cards(CardFilters {
                card_type: Some(CardType::Elite),
                ..CardFilters::default()
            })
            .await
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("NAME"));
        assert!(lines[1].starts_with("Blazing Arrows"));
        assert!(lines[2].starts_with("Fire Rain"));
        assert_eq!(lines[3], "2 shown, 2 matched, 10 total");
    }

    #[tokio::test]
    async fn grouped_cards_print_a_section_per_tier() {
        let app = app_as(Role::Member, OutputMode::Text).await;
        let out = app
            .cards(CardFilters {
                towers: vec!["Archer".into()],
                group_by_tier: true,
                ..CardFilters::default()
            })
            .await
            .unwrap();
        let t1 = out.find("[T1]").unwrap();
        let t3 = out.find("[T3]").unwrap();
        assert!(t1 < t3);
        assert!(!out.contains("[T2]"));
    }

    #[tokio::test]
    async fn structured_output_is_the_records() {
        let app = app_as(Role::Member, OutputMode::Json).await;
        let out = app.turrets(TurretFilters::default()).await.unwrap();
        let turrets: Vec<Turret> = serde_json::from_str(&out).unwrap();
        assert_eq!(turrets.len(), 5);
        assert_eq!(turrets[0].name, "Laser");
    }

    #[tokio::test]
    async fn member_cannot_list_everyones_reports() {
        let app = app_as(Role::Member, OutputMode::Text).await;
        let err = app.reports(ReportFilters::default(), false).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CatalogError>(),
            Some(CatalogError::Unauthorized { .. })
        ));
        // Their own list is allowed and starts empty.
        let mine = app.reports(ReportFilters::default(), true).await.unwrap();
        assert!(mine.ends_with("0 shown, 0 matched, 0 total\n"));
    }

    #[tokio::test]
    async fn submitted_report_shows_up_in_my_reports() {
        let app = app_as(Role::Member, OutputMode::Json).await;
        let command = Command::Report(crate::cli::SubmitReportArgs {
            title: "Typo on chips page".into(),
            description: "Legendary is spelled wrong in the header.".into(),
            kind: towerdex_catalog::ReportType::Translation,
        });
        app.execute(command).await.unwrap();

        let out = app.reports(ReportFilters::default(), true).await.unwrap();
        let reports: Vec<Report> = serde_json::from_str(&out).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].title, "Typo on chips page");
    }

    #[tokio::test]
    async fn booster_pages_use_the_configured_size() {
        let mut app = app_as(Role::Admin, OutputMode::Text).await;
        app.config.booster_page_size = 1;
        let out = app
            .boosters(BoosterFilters {
                page: 2,
                ..BoosterFilters::default()
            })
            .await
            .unwrap();
        assert!(out.contains("Ironclad"));
        assert!(!out.contains("Skyfall"));
        assert!(out.ends_with("page 2 of 2\n"));
    }

    #[tokio::test]
    async fn api_command_prints_status_and_body() {
        let app = app_as(Role::Member, OutputMode::Text).await;
        let out = app
            .execute(Command::Api(ApiArgs {
                target: "/api/turret?name=hive".into(),
                method: "GET".into(),
            }))
            .await
            .unwrap();
        assert!(out.starts_with("200 application/json\n"));
        assert!(out.contains("\"name\": \"Hive\""));

        let err = app
            .execute(Command::Api(ApiArgs {
                target: "/cards".into(),
                method: "GET".into(),
            }))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not an API path"));
    }

    #[tokio::test]
    async fn browse_applies_only_the_last_line_before_end_of_input() {
        let app = app_as(Role::Member, OutputMode::Text).await;
        let input: &[u8] = b"las\nlaser\n";
        let mut out = Vec::new();
        app.browse(Screen::Turrets, input, &mut out).await.unwrap();

        let out = String::from_utf8(out).unwrap();
        let renders: Vec<&str> = out.matches(" total\n").collect();
        assert_eq!(renders.len(), 2);
        assert!(out.ends_with("1 shown, 1 matched, 5 total\n\n"));
    }

    #[tokio::test]
    async fn browse_honours_the_out_file() {
        let app = app_as(Role::Member, OutputMode::Text).await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("browse.txt");
        let destination = OutputDestination::File(path.clone());

        let input: &[u8] = b"hive\n";
        app.browse_into(Screen::Turrets, input, &destination)
            .await
            .unwrap();

        let out = std::fs::read_to_string(path).unwrap();
        assert_eq!(out.matches(" total\n").count(), 2);
        assert!(out.contains("Hive"));
        assert!(out.ends_with("1 shown, 1 matched, 5 total\n\n"));
    }
}
