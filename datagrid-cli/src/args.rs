//! Command-line arguments.

use std::path::PathBuf;

use datagrid_lib::config::DEFAULT_PAGE_SIZE;
use datagrid_lib::query::Sorting;

pub const USAGE: &str = "\
Usage: datagrid-cli <endpoint> [options]

Options:
  --table-id ID            Namespace for persisted state (default: derived from endpoint)
  --page-size N            Rows per page (default: 5)
  --search Q               Free-text search
  --filter KEY=VALUE       Field filter, repeatable
  --sort COLUMN[:asc|desc] Sort column and direction
  --columns a,b,c          Columns to show (default: fields of the first record)
  --pages N                Pages to load (default: 1)
  --export DIR             Write data_export.csv into DIR
  --reset                  Clear persisted state before loading
  -h, --help               Show this help";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ArgsError {
    #[error("help requested")]
    Help,

    #[error("missing endpoint")]
    MissingEndpoint,

    #[error("unexpected argument: {0}")]
    Unexpected(String),

    #[error("{0} requires a value")]
    MissingValue(String),

    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub endpoint: String,
    pub table_id: Option<String>,
    pub page_size: usize,
    pub search: Option<String>,
    pub filters: Vec<(String, String)>,
    pub sort: Option<Sorting>,
    pub columns: Vec<String>,
    pub pages: usize,
    pub export: Option<PathBuf>,
    pub reset: bool,
}

impl CliArgs {
    /// Parses arguments, excluding the program name.
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut endpoint = None;
        let mut parsed = CliArgs {
            endpoint: String::new(),
            table_id: None,
            page_size: DEFAULT_PAGE_SIZE,
            search: None,
            filters: Vec::new(),
            sort: None,
            columns: Vec::new(),
            pages: 1,
            export: None,
            reset: false,
        };

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| ArgsError::MissingValue(flag.to_string()))
            };
            match arg.as_str() {
                "-h" | "--help" => return Err(ArgsError::Help),
                "--table-id" => parsed.table_id = Some(value("--table-id")?),
                "--page-size" => parsed.page_size = positive("--page-size", value("--page-size")?)?,
                "--search" => parsed.search = Some(value("--search")?),
                "--filter" => {
                    let raw = value("--filter")?;
                    let (key, val) = raw
                        .split_once('=')
                        .filter(|(key, _)| !key.is_empty())
                        .ok_or_else(|| invalid("--filter", &raw))?;
                    parsed.filters.push((key.to_string(), val.to_string()));
                }
                "--sort" => parsed.sort = Some(parse_sort(&value("--sort")?)?),
                "--columns" => {
                    parsed.columns = value("--columns")?
                        .split(',')
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "--pages" => parsed.pages = positive("--pages", value("--pages")?)?,
                "--export" => parsed.export = Some(PathBuf::from(value("--export")?)),
                "--reset" => parsed.reset = true,
                flag if flag.starts_with('-') => return Err(ArgsError::Unexpected(arg)),
                _ if endpoint.is_none() => endpoint = Some(arg),
                _ => return Err(ArgsError::Unexpected(arg)),
            }
        }

        parsed.endpoint = endpoint.ok_or(ArgsError::MissingEndpoint)?;
        Ok(parsed)
    }

    /// Table id from `--table-id`, else the endpoint's last path segment.
    pub fn table_id(&self) -> String {
        if let Some(id) = &self.table_id {
            return id.clone();
        }
        let path = self.endpoint.split(['?', '#']).next().unwrap_or_default();
        path.trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty() && !segment.contains(':'))
            .map(|segment| format!("{}-table", segment))
            .unwrap_or_else(|| "data-table".to_string())
    }
}

fn invalid(flag: &str, value: &str) -> ArgsError {
    ArgsError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    }
}

fn positive(flag: &str, value: String) -> Result<usize, ArgsError> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid(flag, &value)),
    }
}

fn parse_sort(value: &str) -> Result<Sorting, ArgsError> {
    let (column, direction) = value.split_once(':').unwrap_or((value, "asc"));
    if column.is_empty() {
        return Err(invalid("--sort", value));
    }
    match direction {
        "asc" => Ok(Sorting::asc(column)),
        "desc" => Ok(Sorting::desc(column)),
        _ => Err(invalid("--sort", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs, ArgsError> {
        CliArgs::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["https://example.com/users"]).unwrap();
        assert_eq!(args.endpoint, "https://example.com/users");
        assert_eq!(args.page_size, 5);
        assert_eq!(args.pages, 1);
        assert!(args.filters.is_empty());
        assert!(!args.reset);
        assert_eq!(args.table_id(), "users-table");
    }

    #[test]
    fn test_all_options() {
        let args = parse(&[
            "--page-size", "10",
            "https://example.com/api/users?limit=5",
            "--search", "ann",
            "--filter", "city=New York",
            "--filter", "role=",
            "--sort", "name:desc",
            "--columns", "id, name,,email",
            "--pages", "3",
            "--export", "/tmp/out",
            "--table-id", "people",
            "--reset",
        ])
        .unwrap();

        assert_eq!(args.page_size, 10);
        assert_eq!(args.search.as_deref(), Some("ann"));
        assert_eq!(
            args.filters,
            [
                ("city".to_string(), "New York".to_string()),
                ("role".to_string(), String::new())
            ]
        );
        assert_eq!(args.sort, Some(Sorting::desc("name")));
        assert_eq!(args.columns, ["id", "name", "email"]);
        assert_eq!(args.pages, 3);
        assert_eq!(args.export, Some(PathBuf::from("/tmp/out")));
        assert_eq!(args.table_id(), "people");
        assert!(args.reset);
    }

    #[test]
    fn test_table_id_from_endpoint() {
        let args = parse(&["https://example.com/api/orders/?page=2"]).unwrap();
        assert_eq!(args.table_id(), "orders-table");
        let args = parse(&["https://example.com"]).unwrap();
        assert_eq!(args.table_id(), "example.com-table");
    }

    #[test]
    fn test_sort_defaults_to_ascending() {
        let args = parse(&["u", "--sort", "age"]).unwrap();
        assert_eq!(args.sort, Some(Sorting::asc("age")));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse(&[]), Err(ArgsError::MissingEndpoint));
        assert_eq!(parse(&["--help"]), Err(ArgsError::Help));
        assert_eq!(parse(&["u", "--search"]), Err(ArgsError::MissingValue("--search".into())));
        assert_eq!(parse(&["u", "--bogus"]), Err(ArgsError::Unexpected("--bogus".into())));
        assert_eq!(parse(&["u", "v"]), Err(ArgsError::Unexpected("v".into())));
        assert!(matches!(parse(&["u", "--page-size", "0"]), Err(ArgsError::InvalidValue { .. })));
        assert!(matches!(parse(&["u", "--filter", "novalue"]), Err(ArgsError::InvalidValue { .. })));
        assert!(matches!(parse(&["u", "--sort", "name:up"]), Err(ArgsError::InvalidValue { .. })));
    }
}
