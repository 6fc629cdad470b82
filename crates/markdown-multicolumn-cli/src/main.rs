use anyhow::{Context, Result, bail};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use markdown_multicolumn_config::Config;
use markdown_multicolumn_engine::{
    ColumnWidth, Engine, ExportTarget, HostSimulator, HtmlExport, LengthUnit, LineMeasure,
    PlainTextExport, RegionRender, ScanLimits, io,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::{
    env,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Print,
    Html,
}

#[derive(Debug)]
struct Args {
    mode: Mode,
    path: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut mode = Mode::Browse;
    let mut path = None;
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--print" => mode = Mode::Print,
            "--html" => mode = Mode::Html,
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            value if path.is_none() => path = Some(PathBuf::from(value)),
            _ => bail!("only one path may be given"),
        }
    }
    Ok(Args { mode, path })
}

fn limits_from(config: &Config) -> ScanLimits {
    ScanLimits {
        max_fence_tokens: config.max_fence_tokens,
        max_region_tags: config.max_region_tags,
    }
}

/// Reads `file` and mounts every block of it into a fresh engine.
fn load_document(file: &Path, root: &Path, limits: ScanLimits) -> Result<(Engine, HostSimulator)> {
    let relative = io::document_path(file, root)?;
    let (document, content) = io::read_document(&relative, root)
        .with_context(|| format!("reading {}", file.display()))?;
    let mut engine = Engine::new(limits);
    let mut host = HostSimulator::new(document, content);
    host.mount_all(&mut engine);
    log::info!(
        "{}: {} blocks, {} regions",
        host.document(),
        host.block_count(),
        engine.directory().len()
    );
    Ok((engine, host))
}

/// One region of the selected document, ready to draw.
struct RegionPreview {
    title: String,
    columns: Vec<ColumnPreview>,
    notes: Vec<String>,
}

struct ColumnPreview {
    percent: u16,
    lines: Vec<String>,
}

fn column_percent(width: &ColumnWidth, columns: usize) -> u16 {
    match width.unit {
        LengthUnit::Percent => width.value.clamp(1.0, 100.0).round() as u16,
        _ => (100 / columns.max(1)) as u16,
    }
}

fn preview_region(engine: &Engine, host: &HostSimulator, region_id: &str, render: &RegionRender) -> RegionPreview {
    let manager = engine.directory().get(host.document(), region_id);
    let mut columns = vec![];
    for group in &render.groups {
        for column in &group.columns {
            let mut lines = vec![];
            for id in &column.items {
                let Some(object) = manager.and_then(|m| m.content().get_by_id(*id)) else {
                    continue;
                };
                lines.extend(object.fragment.text.lines().map(str::to_string));
                lines.push(String::new());
            }
            columns.push(ColumnPreview {
                percent: column_percent(&column.width, group.columns.len()),
                lines,
            });
        }
    }
    RegionPreview {
        title: format!(" {region_id} ({:?}) ", render.strategy),
        columns,
        notes: render.warnings.iter().map(ToString::to_string).collect(),
    }
}

struct App {
    root: PathBuf,
    files: Vec<PathBuf>,
    file_list_state: ListState,
    limits: ScanLimits,
    measure: LineMeasure,
    regions: Vec<RegionPreview>,
    status: Vec<String>,
}

impl App {
    fn new(root: PathBuf, files: Vec<PathBuf>, config: &Config) -> Self {
        let mut app = Self {
            root,
            files,
            file_list_state: ListState::default(),
            limits: limits_from(config),
            measure: LineMeasure::new(config.line_height),
            regions: vec![],
            status: vec![],
        };

        if !app.files.is_empty() {
            app.file_list_state.select(Some(0));
            app.update_preview();
        }
        app
    }

    fn next_file(&mut self) {
        if self.files.is_empty() {
            return;
        }
        let i = match self.file_list_state.selected() {
            Some(i) => (i + 1) % self.files.len(),
            None => 0,
        };
        self.file_list_state.select(Some(i));
        self.update_preview();
    }

    fn previous_file(&mut self) {
        if self.files.is_empty() {
            return;
        }
        let i = match self.file_list_state.selected() {
            Some(0) | None => self.files.len() - 1,
            Some(i) => i - 1,
        };
        self.file_list_state.select(Some(i));
        self.update_preview();
    }

    fn update_preview(&mut self) {
        self.regions.clear();
        self.status.clear();
        let Some(file) = self.file_list_state.selected().and_then(|i| self.files.get(i)) else {
            return;
        };

        let (mut engine, host) = match load_document(file, &self.root, self.limits) {
            Ok(loaded) => loaded,
            Err(e) => {
                self.status.push(format!("Error reading file: {e:#}"));
                return;
            }
        };

        for (index, error) in host.rejections() {
            self.status.push(format!("block {}: {error}", index + 1));
        }
        for region_id in host.region_ids() {
            let Some(render) = engine
                .render_region(host.document(), &region_id, &mut self.measure)
                .cloned()
            else {
                continue;
            };
            self.regions.push(preview_region(&engine, &host, &region_id, &render));
        }
        if self.regions.is_empty() && self.status.is_empty() {
            self.status.push("No multi-column regions in this document".to_string());
        }
    }

    fn file_name(&self, file: &Path) -> String {
        file.strip_prefix(&self.root)
            .unwrap_or(file)
            .display()
            .to_string()
    }
}

/// Feeds every region of `file` through an export target.
fn export<T: ExportTarget>(file: &Path, root: &Path, config: &Config, mut target: T) -> Result<T> {
    let (mut engine, host) = load_document(file, root, limits_from(config))?;
    let mut measure = LineMeasure::new(config.line_height);
    for (_, error) in host.rejections() {
        target.error(error);
    }
    for region_id in host.region_ids() {
        engine.export_region(host.document(), &region_id, &mut target, &mut measure);
    }
    Ok(target)
}

fn main() -> Result<()> {
    // Warnings only: the TUI shares stderr with the terminal
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();
    let usage = format!("Usage: {} [--print | --html] [document-or-directory]", args[0]);

    let parsed = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{usage}");
            process::exit(1);
        }
    };

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let path = match parsed.path.or_else(|| config.document_dir.clone()) {
        Some(path) => path,
        None => {
            eprintln!("Error: No document given and no document_dir in config");
            eprintln!("{usage}");
            eprintln!("Or set document_dir in {}", config_path.display());
            process::exit(1);
        }
    };

    let (root, files) = if path.is_dir() {
        let files = io::scan_markdown_files(&path)?;
        (path, files)
    } else {
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        (root, vec![path])
    };

    match parsed.mode {
        Mode::Print => {
            for file in &files {
                let text = export(file, &root, &config, PlainTextExport::new())?;
                print!("{}", text.finish());
            }
            return Ok(());
        }
        Mode::Html => {
            for file in &files {
                let html = export(file, &root, &config, HtmlExport::new())?;
                print!("{}", html.finish());
            }
            return Ok(());
        }
        Mode::Browse => {}
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(root, files, &config);

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next_file(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_file(),
                KeyCode::Char('r') => app.update_preview(),
                _ => {}
            }
        }
    }
}

fn draw_region(f: &mut Frame, region: &RegionPreview, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(region.title.as_str());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(region.notes.len() as u16)])
        .split(inner);

    let constraints: Vec<Constraint> = region
        .columns
        .iter()
        .map(|column| Constraint::Percentage(column.percent))
        .collect();
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(rows[0]);

    for (column, cell) in region.columns.iter().zip(cells.iter()) {
        let text: Vec<Line> = column.lines.iter().map(|l| Line::from(l.as_str())).collect();
        let paragraph = Paragraph::new(text)
            .block(Block::default().borders(Borders::LEFT | Borders::RIGHT))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, *cell);
    }

    let notes: Vec<Line> = region
        .notes
        .iter()
        .map(|note| Line::from(Span::styled(note.as_str(), Style::default().fg(Color::Yellow))))
        .collect();
    f.render_widget(Paragraph::new(notes).wrap(Wrap { trim: true }), rows[1]);
}

fn ui(f: &mut Frame, app: &mut App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(outer[0]);

    // File list panel
    let file_items: Vec<ListItem> = app
        .files
        .iter()
        .map(|file| ListItem::new(Line::from(app.file_name(file))))
        .collect();
    let files_list = List::new(file_items)
        .block(Block::default().borders(Borders::ALL).title("Documents"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
    f.render_stateful_widget(files_list, chunks[0], &mut app.file_list_state);

    // Region panel: status lines, then one row per region
    let mut constraints = vec![Constraint::Length(app.status.len() as u16)];
    constraints.extend(app.regions.iter().map(|_| Constraint::Fill(1)));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(chunks[1]);

    let status: Vec<Line> = app.status.iter().map(|s| Line::from(s.as_str())).collect();
    f.render_widget(Paragraph::new(status).wrap(Wrap { trim: true }), rows[0]);
    for (region, area) in app.regions.iter().zip(rows.iter().skip(1)) {
        draw_region(f, region, *area);
    }

    let help_text = Line::from(vec![
        Span::raw("q: Quit | "),
        Span::raw("↑/k: Previous | "),
        Span::raw("↓/j: Next | "),
        Span::raw("r: Reload"),
    ]);
    f.render_widget(Paragraph::new(help_text), outer[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        std::iter::once("cli")
            .chain(values.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_parse_print_mode() {
        let parsed = parse_args(&args(&["--print", "doc.md"])).unwrap();
        assert_eq!(parsed.mode, Mode::Print);
        assert_eq!(parsed.path, Some(PathBuf::from("doc.md")));
    }

    #[test]
    fn test_parse_rejects_unknown_flag() {
        assert!(parse_args(&args(&["--columns"])).is_err());
        assert!(parse_args(&args(&["a.md", "b.md"])).is_err());
    }

    #[test]
    fn test_column_percent() {
        assert_eq!(column_percent(&ColumnWidth::percent(33.3), 3), 33);
        let px = ColumnWidth {
            value: 200.0,
            unit: LengthUnit::Px,
        };
        assert_eq!(column_percent(&px, 4), 25);
    }
}
