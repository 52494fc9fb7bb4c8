mod args;
mod paths;
mod render;

use std::fs;
use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use datagrid_lib::columns::Column;
use datagrid_lib::config::FilterDescriptor;
use datagrid_lib::config::GridConfig;
use datagrid_lib::config::TableConfig;
use datagrid_lib::error::FetchError;
use datagrid_lib::error::StorageError;
use datagrid_lib::query::Query;
use datagrid_lib::source::HttpSource;
use datagrid_lib::source::RecordSource;
use datagrid_lib::storage::MemoryBackend;
use datagrid_lib::storage::SqliteBackend;
use datagrid_lib::storage::StorageBackend;
use datagrid_lib::storage::TableStorage;
use datagrid_lib::view::DataGrid;
use datagrid_lib::view::Outcome;
use datagrid_lib::view::ToolbarIntent;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

use args::ArgsError;
use args::CliArgs;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(ArgsError::Help) => {
            println!("{}", args::USAGE);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, args::USAGE);
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else { return };
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    match File::create(&path) {
        Ok(file) => {
            let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), file);
        }
        Err(e) => eprintln!("Warning: cannot create log file {}: {}", path.display(), e),
    }
}

async fn open_backend() -> Result<Arc<dyn StorageBackend>, StorageError> {
    let Some(path) = paths::storage_db() else {
        log::warn!("No data directory available; state will not persist");
        return Ok(Arc::new(MemoryBackend::new()));
    };
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    log::info!("Opening table state at {}", path.display());
    Ok(Arc::new(SqliteBackend::open(&path).await?))
}

/// Columns named on the command line, else the fields of the first record.
async fn resolve_columns(args: &CliArgs, source: &HttpSource) -> Result<Vec<Column>, FetchError> {
    let keys = if args.columns.is_empty() {
        let records = source.fetch_records(&Query::default()).await?;
        let mut keys: Vec<String> = records
            .first()
            .and_then(|record| record.as_value().as_object())
            .map(|fields| fields.keys().cloned().collect())
            .unwrap_or_default();
        if let Some(pos) = keys.iter().position(|key| key == "id") {
            let id = keys.remove(pos);
            keys.insert(0, id);
        }
        keys
    } else {
        args.columns.clone()
    };

    let mut columns = vec![Column::select()];
    columns.extend(keys.into_iter().map(|key| Column::new(key).sortable()));
    Ok(columns)
}

async fn run(args: CliArgs) -> Result<(), CliError> {
    let source = HttpSource::builder()
        .endpoint(args.endpoint.clone())
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    let table_id = args.table_id();
    let storage = TableStorage::with_shared(table_id.clone(), open_backend().await?);
    if args.reset {
        log::info!("Clearing stored state for {}", table_id);
        storage.clear().await;
    }

    let columns = resolve_columns(&args, &source).await?;

    let mut table = TableConfig::new(table_id).with_page_size(args.page_size);
    for (key, _) in &args.filters {
        if !table.additional_filters.iter().any(|filter| &filter.key == key) {
            table = table.with_filter(FilterDescriptor::text(key.clone(), key.clone()));
        }
    }
    let mut config = GridConfig::new(table).with_export(args.export.is_some());
    if let Some(dir) = &args.export {
        config = config.with_download_dir(dir.clone());
    }

    let mut grid = DataGrid::mount(source, storage, columns, config).await;

    if let Some(search) = &args.search {
        grid.handle_toolbar(ToolbarIntent::SetSearch(search.clone()))
            .await;
    }
    for (key, value) in &args.filters {
        grid.handle_toolbar(ToolbarIntent::FilterChanged {
            key: key.clone(),
            value: value.clone(),
        })
        .await;
    }
    if let Some(sort) = &args.sort {
        grid.table().set_sorting(Some(sort.clone())).await;
    }
    for _ in 1..args.pages {
        if !grid.table().load_more().await {
            break;
        }
    }

    let snapshot = grid.table().snapshot().await;
    if let Some(error) = &snapshot.last_error {
        eprintln!("Warning: last fetch failed: {}", error);
    }
    println!("{}", render::toolbar(&grid.toolbar_view(&snapshot)));
    println!();
    println!("{}", render::content(&grid.content_view(&snapshot)));

    if args.export.is_some() {
        match grid.handle_toolbar(ToolbarIntent::Export).await {
            Outcome::Exported(path) => println!("\nExported to {}", path.display()),
            Outcome::Alert(alert) => eprintln!("{}", alert.message()),
            Outcome::None => {}
        }
    }

    Ok(())
}
