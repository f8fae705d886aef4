use std::{fs, path::Path};

use chrono::NaiveDate;

use cashflow_config::model::CONFIG_KEYS;
use cashflow_core::{
    CalendarRow, CalendarView, ComparisonPeriod, ComparisonService, DateFormatter, Projection,
    ProjectionError, ProjectionService,
};
use cashflow_domain::{DateWindow, FlowCategory, FlowEntry};
use cashflow_storage_json::{load_snapshot_from_path, SnapshotStorage};

use crate::cli::{
    context::{CommandError, CommandResult, LoadedSnapshot, ShellContext},
    formatters::CliFormatters,
    output,
    registry::{CommandEntry, CommandRegistry},
    style::style,
    table::{Table, TableColumn, TableRenderer},
};
use crate::utils::build_info;

pub fn register_all(registry: &mut CommandRegistry) {
    registry.register(CommandEntry::new(
        "help",
        "List commands or show usage for one command",
        "help [command]",
        cmd_help,
    ));
    registry.register(CommandEntry::new(
        "load",
        "Load a snapshot from a JSON file or from the snapshot store",
        "load <path|name>",
        cmd_load,
    ));
    registry.register(CommandEntry::new(
        "save",
        "Store the loaded snapshot under a name",
        "save <name>",
        cmd_save,
    ));
    registry.register(CommandEntry::new(
        "snapshots",
        "List stored snapshots",
        "snapshots",
        cmd_snapshots,
    ));
    registry.register(CommandEntry::new(
        "project",
        "Project the daily calendar for a window",
        "project <start> <end> [balance]",
        cmd_project,
    ));
    registry.register(CommandEntry::new(
        "compare",
        "Project two periods side by side",
        "compare <startA> <endA> <startB> <endB> [balanceA] [balanceB]",
        cmd_compare,
    ));
    registry.register(CommandEntry::new(
        "export",
        "Write a projection as JSON",
        "export <start> <end> <file> [balance]",
        cmd_export,
    ));
    registry.register(CommandEntry::new(
        "show",
        "Show a flow category in calendar output",
        "show <projected-inflows|projected-outflows|custom-inflows|custom-outflows|all>",
        cmd_show,
    ));
    registry.register(CommandEntry::new(
        "hide",
        "Hide a flow category from calendar output (balances are unchanged)",
        "hide <projected-inflows|projected-outflows|custom-inflows|custom-outflows|all>",
        cmd_hide,
    ));
    registry.register(CommandEntry::new(
        "config",
        "Show or change configuration",
        "config [get <key> | set <key> <value> | backup | backups | restore <backup>]",
        cmd_config,
    ));
    registry.register(CommandEntry::new(
        "version",
        "Show build information",
        "version",
        cmd_version,
    ));
    registry.register(CommandEntry::new("exit", "Leave the shell", "exit", cmd_exit));
    registry.alias("quit", "exit");
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first() {
        let entry = context.registry.get(&name.to_lowercase()).ok_or_else(|| {
            CommandError::InvalidArguments(format!("unknown command `{name}`"))
        })?;
        output::info(format!("{} - {}", entry.name, entry.description));
        output::hint(format!("usage: {}", entry.usage));
        return Ok(());
    }

    let mut table = Table::new(
        Some("Commands"),
        vec![TableColumn::left("Command", 10), TableColumn::left("Description", 20)],
    );
    for entry in context.registry.list() {
        table.add_row(vec![entry.name, entry.description]);
    }
    TableRenderer::print(&table, &style());
    Ok(())
}

fn cmd_load(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let target = single_arg(args, "load <path|name>")?;
    let path = Path::new(target);
    let (label, snapshot) = if path.is_file() {
        let label = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(target)
            .to_string();
        (label, load_snapshot_from_path(path)?)
    } else {
        (target.to_string(), context.storage.load_snapshot(target)?)
    };

    output::success(format!(
        "Loaded `{label}`: {} open invoices, {} bills, {} custom flows, opening balance {}.",
        snapshot.open_invoice_count(),
        snapshot.bills.len(),
        snapshot.custom_flows.len(),
        context.formatters().money(snapshot.initial_balance),
    ));
    context.config.last_opened_snapshot = Some(label.clone());
    context.persist_config()?;
    context.loaded = Some(LoadedSnapshot { label, snapshot });
    Ok(())
}

fn cmd_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let name = single_arg(args, "save <name>")?;
    let snapshot = context.snapshot()?;
    context.storage.save_snapshot(name, snapshot)?;
    let path = context.storage.snapshot_path(name);
    output::success(format!("Snapshot stored at {}.", path.display()));
    Ok(())
}

fn cmd_snapshots(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let rows = context.storage.list_snapshot_metadata()?;
    if rows.is_empty() {
        output::info(format!(
            "No snapshots stored in {}.",
            context.storage.root().display()
        ));
        return Ok(());
    }
    let formatters = context.formatters();
    let mut table = Table::new(
        Some("Stored snapshots"),
        vec![
            TableColumn::left("Name", 8),
            TableColumn::right("Opening", 10),
            TableColumn::right("Invoices", 8),
            TableColumn::right("Bills", 5),
            TableColumn::right("Custom", 6),
        ],
    );
    for row in rows {
        table.add_row(vec![
            row.name,
            formatters.money(row.initial_balance),
            row.open_invoice_count.to_string(),
            row.bill_count.to_string(),
            row.custom_flow_count.to_string(),
        ]);
    }
    TableRenderer::print(&table, &style());
    Ok(())
}

fn cmd_project(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "project <start> <end> [balance]";
    if !(2..=3).contains(&args.len()) {
        return Err(usage_error(usage));
    }
    let projection = run_projection(context, args[0], args[1], args.get(2).copied())?;
    render_projection(context, &projection, "Projection");
    Ok(())
}

fn cmd_compare(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "compare <startA> <endA> <startB> <endB> [balanceA] [balanceB]";
    if !(4..=6).contains(&args.len()) {
        return Err(usage_error(usage));
    }
    let snapshot = context.snapshot()?;
    let a = ComparisonPeriod::new(
        parse_balance(args.get(4).copied(), snapshot.initial_balance)?,
        parse_window(args[0], args[1])?,
    );
    let b = ComparisonPeriod::new(
        parse_balance(args.get(5).copied(), snapshot.initial_balance)?,
        parse_window(args[2], args[3])?,
    );
    let predictor = context.predictor()?;
    let report = ComparisonService::new(context.projection_options()).compare(
        snapshot,
        &predictor,
        a,
        b,
    )?;

    render_projection(context, &report.period_a, "Period A");
    render_projection(context, &report.period_b, "Period B");
    output::section("Comparison");
    output::info(format!(
        "Final balance A {} | B {} | delta {}",
        context.formatters().money(report.period_a.final_balance()),
        context.formatters().money(report.period_b.final_balance()),
        context.formatters().signed(report.final_balance_delta()),
    ));
    Ok(())
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let usage = "export <start> <end> <file> [balance]";
    if !(3..=4).contains(&args.len()) {
        return Err(usage_error(usage));
    }
    let projection = run_projection(context, args[0], args[1], args.get(3).copied())?;
    let json = serde_json::to_string_pretty(&projection)?;
    fs::write(args[2], json)?;
    output::success(format!(
        "Wrote {} days to {}.",
        projection.buckets.len(),
        args[2]
    ));
    Ok(())
}

fn cmd_show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    set_visibility(context, args, true)
}

fn cmd_hide(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    set_visibility(context, args, false)
}

fn set_visibility(context: &mut ShellContext, args: &[&str], visible: bool) -> CommandResult {
    let raw = single_arg(args, if visible { "show <category>" } else { "hide <category>" })?;
    let categories: Vec<FlowCategory> = if raw.eq_ignore_ascii_case("all") {
        FlowCategory::ALL.to_vec()
    } else {
        let category = FlowCategory::parse(raw).ok_or_else(|| {
            CommandError::InvalidArguments(format!(
                "unknown category `{raw}`; expected one of: {}",
                category_names()
            ))
        })?;
        vec![category]
    };
    for category in categories {
        context.visibility.set(category, visible);
    }
    let hidden = context.visibility.hidden();
    if hidden.is_empty() {
        output::success("All flow categories are visible.");
    } else {
        let names: Vec<String> = hidden.iter().map(ToString::to_string).collect();
        output::success(format!("Hidden: {}.", names.join(", ")));
    }
    Ok(())
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args {
        [] => {
            let mut table = Table::new(
                Some("Configuration"),
                vec![TableColumn::left("Key", 12), TableColumn::left("Value", 8)],
            );
            for key in CONFIG_KEYS {
                table.add_row(vec![key.to_string(), context.config.get(key)?]);
            }
            TableRenderer::print(&table, &style());
        }
        ["get", key] => output::info(format!("{key} = {}", context.config.get(key)?)),
        ["set", key, value] => {
            context.config.set(key, value)?;
            context.persist_config()?;
            output::success(format!("{key} = {}", context.config.get(key)?));
        }
        ["backup"] => {
            let name = context.config_manager.backup(&context.config)?;
            output::success(format!("Configuration backed up as {name}."));
        }
        ["backups"] => {
            let names = context.config_manager.list_backups()?;
            if names.is_empty() {
                output::info("No configuration backups.");
            }
            for name in names {
                output::info(name);
            }
        }
        ["restore", name] => {
            context.config = context.config_manager.restore(name)?;
            context.persist_config()?;
            output::success(format!("Configuration restored from {name}."));
        }
        _ => {
            return Err(usage_error(
                "config [get <key> | set <key> <value> | backup | backups | restore <backup>]",
            ))
        }
    }
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let build = build_info::current();
    output::info(format!("cashflow_cli {}", build.short()));
    output::hint(format!(
        "built {} for {} ({}), {}",
        build.timestamp, build.target, build.profile, build.rustc
    ));
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}

fn run_projection(
    context: &ShellContext,
    start: &str,
    end: &str,
    balance: Option<&str>,
) -> Result<Projection, CommandError> {
    let snapshot = context.snapshot()?;
    let window = parse_window(start, end)?;
    let balance = parse_balance(balance, snapshot.initial_balance)?;
    let predictor = context.predictor()?;
    let projection = ProjectionService::new(context.projection_options()).project(
        snapshot,
        &predictor,
        window,
        balance,
    )?;
    Ok(projection)
}

fn render_projection(context: &ShellContext, projection: &Projection, title: &str) {
    let formatters = context.formatters();
    let ui = style();
    let rows = CalendarView::render(&projection.buckets, &context.visibility);
    let last = rows.len().saturating_sub(1);

    output::section(format!("{title}: {}", projection.window));
    let mut table = Table::new(
        None::<String>,
        vec![
            TableColumn::left("Date", 14),
            TableColumn::right("Opening", 10),
            TableColumn::right("In", 8),
            TableColumn::right("Out", 8),
            TableColumn::right("Net", 8),
            TableColumn::right("Balance", 10),
            TableColumn::left("Details", 7),
        ],
    );
    for (idx, row) in rows.iter().enumerate() {
        let active = !row.inflows.is_empty() || !row.outflows.is_empty();
        if !active && idx != 0 && idx != last {
            continue;
        }
        table.push_row(
            calendar_cells(&formatters, row),
            row.running_balance < 0.0,
        );
    }
    let rendered = TableRenderer::render(&table, &ui);
    println!("{rendered}");

    let totals = &projection.totals;
    output::info(format!(
        "Inflow {} | Outflow {} | Net {} | Final {}",
        formatters.money(totals.total_inflow),
        formatters.money(totals.total_outflow),
        formatters.signed(totals.net_change),
        formatters.money(totals.final_balance),
    ));
    if let Some(date) = totals.lowest_balance_date {
        output::info(format!(
            "Lowest balance {} on {}",
            formatters.money(totals.lowest_balance),
            formatters.format_date(date)
        ));
    }
    if totals.goes_negative() {
        output::warning("Balance drops below zero in this window.");
    }
    let hidden = context.visibility.hidden();
    if !hidden.is_empty() {
        let names: Vec<String> = hidden.iter().map(ToString::to_string).collect();
        output::hint(format!(
            "Hidden categories: {}. Net and balance include them.",
            names.join(", ")
        ));
    }
    for resolution in &projection.resolutions {
        if resolution.fallbacks.is_empty() {
            continue;
        }
        let reasons: Vec<String> = resolution.fallbacks.iter().map(ToString::to_string).collect();
        output::hint(format!(
            "{} placed by {} ({})",
            resolution.description,
            resolution.source,
            reasons.join("; ")
        ));
    }
}

fn calendar_cells(formatters: &CliFormatters, row: &CalendarRow) -> Vec<String> {
    let visible_in: f64 = row.inflows.iter().map(FlowEntry::magnitude).sum();
    let visible_out: f64 = row.outflows.iter().map(FlowEntry::magnitude).sum();
    let details: Vec<String> = row
        .inflows
        .iter()
        .chain(&row.outflows)
        .map(|entry| {
            if entry.carried_forward {
                format!("{} (overdue)", entry.description)
            } else {
                entry.description.clone()
            }
        })
        .collect();
    vec![
        formatters.format_date(row.date),
        formatters.money(row.opening_balance),
        formatters.money(visible_in),
        formatters.money(visible_out),
        formatters.signed(row.net),
        formatters.money(row.running_balance),
        details.join("; "),
    ]
}

fn category_names() -> String {
    let names: Vec<String> = FlowCategory::ALL.iter().map(ToString::to_string).collect();
    names.join(", ")
}

fn single_arg<'a>(args: &[&'a str], usage: &str) -> Result<&'a str, CommandError> {
    match args {
        [value] => Ok(*value),
        _ => Err(usage_error(usage)),
    }
}

fn usage_error(usage: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {usage}"))
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{input}` (use YYYY-MM-DD)"))
    })
}

fn parse_window(start: &str, end: &str) -> Result<DateWindow, CommandError> {
    let window = DateWindow::new(parse_date(start)?, parse_date(end)?)
        .map_err(ProjectionError::from)?;
    Ok(window)
}

fn parse_balance(input: Option<&str>, default: f64) -> Result<f64, CommandError> {
    match input {
        None => Ok(default),
        Some(raw) => raw.replace(',', "").parse::<f64>().map_err(|_| {
            CommandError::InvalidArguments(format!("invalid balance `{raw}`"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use cashflow_domain::{CustomCashFlow, FlowType, Invoice, ProjectionSnapshot};
    use cashflow_storage_json::save_snapshot_to_path;
    use tempfile::{tempdir, TempDir};

    use super::*;
    use crate::cli::{context::CliMode, shell::handle_line, LoopControl};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn context() -> (TempDir, ShellContext) {
        let dir = tempdir().unwrap();
        let context =
            ShellContext::with_base_dir(CliMode::Script, dir.path().to_path_buf(), true).unwrap();
        (dir, context)
    }

    fn write_snapshot(dir: &TempDir) -> PathBuf {
        let mut snapshot = ProjectionSnapshot::new(10_000.0);
        snapshot
            .invoices
            .push(Invoice::new("INV-1", date(2024, 3, 1), 5_000.0));
        snapshot.predictions.insert("INV-1".into(), date(2024, 3, 1));
        snapshot.custom_flows.push(CustomCashFlow::one_time(
            FlowType::Outflow,
            1_000.0,
            date(2024, 3, 5),
        ));
        let path = dir.path().join("march.json");
        save_snapshot_to_path(&snapshot, &path).unwrap();
        path
    }

    fn run(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
        handle_line(context, line)
    }

    #[test]
    fn load_reads_snapshot_file_and_remembers_it() {
        let (dir, mut context) = context();
        let path = write_snapshot(&dir);

        run(&mut context, &format!("load {}", path.display())).unwrap();

        let loaded = context.loaded.as_ref().unwrap();
        assert_eq!(loaded.label, "march");
        assert_eq!(loaded.snapshot.initial_balance, 10_000.0);
        let stored = context.config_manager.load().unwrap();
        assert_eq!(stored.last_opened_snapshot.as_deref(), Some("march"));
    }

    #[test]
    fn projection_requires_a_snapshot() {
        let (_dir, mut context) = context();
        let err = run(&mut context, "project 2024-03-01 2024-03-05").unwrap_err();
        assert!(matches!(err, CommandError::NoSnapshot));
    }

    #[test]
    fn projection_rejects_bad_dates_and_inverted_windows() {
        let (dir, mut context) = context();
        let path = write_snapshot(&dir);
        run(&mut context, &format!("load {}", path.display())).unwrap();

        let err = run(&mut context, "project 2024-13-01 2024-03-05").unwrap_err();
        assert!(matches!(err, CommandError::InvalidArguments(_)));
        let err = run(&mut context, "project 2024-03-05 2024-03-01").unwrap_err();
        assert!(matches!(
            err,
            CommandError::Projection(ProjectionError::Validation(_))
        ));
        assert!(run(&mut context, "project 2024-03-01 2024-03-05 2500").is_ok());
    }

    #[test]
    fn hide_and_show_toggle_visibility() {
        let (_dir, mut context) = context();
        run(&mut context, "hide custom-outflows").unwrap();
        assert!(!context.visibility.custom_outflows);
        run(&mut context, "hide all").unwrap();
        assert_eq!(context.visibility.hidden().len(), 4);
        run(&mut context, "show invoices").unwrap();
        assert!(context.visibility.projected_inflows);

        let err = run(&mut context, "hide payroll").unwrap_err();
        assert!(matches!(err, CommandError::InvalidArguments(_)));
    }

    #[test]
    fn config_set_is_persisted() {
        let (_dir, mut context) = context();
        run(&mut context, "config set overdue_policy exclude").unwrap();
        run(&mut context, "config set max_window_days 90").unwrap();

        let stored = context.config_manager.load().unwrap();
        assert_eq!(stored.overdue_policy.to_string(), "exclude");
        assert_eq!(context.projection_options().max_window_days, 90);
        assert!(run(&mut context, "config set max_window_days none").is_err());
    }

    #[test]
    fn saved_snapshot_can_be_loaded_by_name() {
        let (dir, mut context) = context();
        let path = write_snapshot(&dir);
        run(&mut context, &format!("load {}", path.display())).unwrap();
        run(&mut context, "save q1-plan").unwrap();
        context.loaded = None;

        run(&mut context, "load q1-plan").unwrap();
        assert_eq!(context.loaded.as_ref().unwrap().label, "q1-plan");
        run(&mut context, "snapshots").unwrap();
    }

    #[test]
    fn export_writes_projection_json() {
        let (dir, mut context) = context();
        let path = write_snapshot(&dir);
        let out = dir.path().join("out.json");
        run(&mut context, &format!("load {}", path.display())).unwrap();
        run(
            &mut context,
            &format!("export 2024-03-01 2024-03-05 {}", out.display()),
        )
        .unwrap();

        let projection: Projection =
            serde_json::from_str(&fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(projection.buckets.len(), 5);
        assert_eq!(projection.final_balance(), 14_000.0);
    }

    #[test]
    fn compare_runs_both_periods() {
        let (dir, mut context) = context();
        let path = write_snapshot(&dir);
        run(&mut context, &format!("load {}", path.display())).unwrap();
        let result = run(
            &mut context,
            "compare 2024-03-01 2024-03-05 2024-04-01 2024-04-05 100 200",
        );
        assert!(matches!(result, Ok(LoopControl::Continue)));
        let err = run(&mut context, "compare 2024-03-01 2024-03-05").unwrap_err();
        assert!(matches!(err, CommandError::InvalidArguments(_)));
    }

    #[test]
    fn exit_and_unknown_commands() {
        let (_dir, mut context) = context();
        assert!(matches!(
            run(&mut context, "porject"),
            Ok(LoopControl::Continue)
        ));
        assert!(matches!(run(&mut context, "quit"), Ok(LoopControl::Exit)));
        assert!(!context.running);
    }
}
