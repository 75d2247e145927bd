// The table currently in use.
//
// A new table replaces the current one only once it has been fully loaded and
// validated. Readers keep the aggregator they obtained until they drop it.

use log::{debug, info};

use std::sync::{Arc, RwLock};

use crate::tally::{io_common::simplify_file_name, *};

/// A loaded and validated table.
#[derive(Debug)]
pub struct LoadedTable {
    pub aggregator: RoundAggregator,
    pub path: String,
    pub source_name: String,
    /// SHA-256 of the content of the file.
    pub digest: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ReloadOutcome {
    /// Same file content and name: the current aggregator is kept.
    Unchanged,
    Replaced,
}

pub struct TableHandle {
    registry: SeasonRegistry,
    options: ReadOptions,
    current: RwLock<Option<Arc<LoadedTable>>>,
}

impl TableHandle {
    pub fn new(registry: SeasonRegistry, options: ReadOptions) -> TableHandle {
        TableHandle {
            registry,
            options,
            current: RwLock::new(None),
        }
    }

    /// Loads the table at the given path.
    ///
    /// On failure, the current table stays in place.
    pub fn reload(&self, path: &str, display_name: Option<&str>) -> TallyResult<ReloadOutcome> {
        ensure!(
            Path::new(path).is_file(),
            NotFoundSnafu {
                path: path.to_string()
            }
        );
        let content = fs::read(path).context(ReadingTableSnafu { path })?;
        let digest = sha256::digest(content.as_slice());
        let source_name = display_name
            .map(|s| s.to_string())
            .unwrap_or_else(|| simplify_file_name(path));

        if let Some(cur) = self.current_opt() {
            if cur.digest == digest && cur.source_name == source_name {
                info!("Content of {} is unchanged, keeping the current table", path);
                return Ok(ReloadOutcome::Unchanged);
            }
        }

        let table = read_table(path, &self.options)?;
        let aggregator =
            RoundAggregator::from_table(table, &source_name, &self.registry, &self.options.layout)
                .context(AggregationSnafu { path })?;
        debug!(
            "reload: {} loaded as season {} (digest {})",
            path,
            aggregator.season(),
            digest
        );

        let loaded = Arc::new(LoadedTable {
            aggregator,
            path: path.to_string(),
            source_name,
            digest,
        });
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(loaded);
        Ok(ReloadOutcome::Replaced)
    }

    pub fn current(&self) -> TallyResult<Arc<LoadedTable>> {
        self.current_opt().context(NoTableLoadedSnafu {})
    }

    fn current_opt(&self) -> Option<Arc<LoadedTable>> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        guard.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tally::schedule_reader::parse_registry;
    use std::path::PathBuf;

    fn handle() -> TableHandle {
        let registry = parse_registry(
            r#"{"seasons": [{"season": "2023", "rounds": [
                {"name": "A"},
                {"name": "B", "eliminated": [{"character": "Bob", "series": "S"}]}
            ]}]}"#,
        )
        .unwrap();
        TableHandle::new(registry, ReadOptions::default())
    }

    fn write(dir: &str, name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn nothing_loaded() {
        let h = handle();
        assert!(matches!(h.current(), Err(TallyError::NoTableLoaded {})));
    }

    #[test]
    fn reload_replaces_then_keeps() {
        let h = handle();
        let path = write(
            "roundtally_handle_1",
            "votes_2023_season.csv",
            "角色,作品,A,B\nAnn,S,1,2\nBob,S,3,4\n",
        );
        let p = path.to_str().unwrap();
        assert_eq!(h.reload(p, None).unwrap(), ReloadOutcome::Replaced);
        let first = h.current().unwrap();
        assert_eq!(first.aggregator.num_contestants(), 2);
        assert_eq!(first.source_name, "votes_2023_season.csv");

        assert_eq!(h.reload(p, None).unwrap(), ReloadOutcome::Unchanged);
        assert!(Arc::ptr_eq(&first, &h.current().unwrap()));

        fs::write(&path, "角色,作品,A,B\nAnn,S,1,2\n").unwrap();
        assert_eq!(h.reload(p, None).unwrap(), ReloadOutcome::Replaced);
        assert_eq!(h.current().unwrap().aggregator.num_contestants(), 1);
        // Readers holding the previous table are not affected.
        assert_eq!(first.aggregator.num_contestants(), 2);
    }

    #[test]
    fn display_name_overrides_file_name() {
        let h = handle();
        let path = write("roundtally_handle_2", "upload", "角色,作品,A,B\nAnn,S,1,2\n");
        let p = path.to_str().unwrap();
        h.reload(p, Some("votes_2023_season.csv")).unwrap();
        assert_eq!(h.current().unwrap().aggregator.season(), "2023");
    }

    #[test]
    fn failed_reload_keeps_the_current_table() {
        let h = handle();
        let good = write(
            "roundtally_handle_3",
            "votes_2023_season.csv",
            "角色,作品,A,B\nAnn,S,1,2\n",
        );
        h.reload(good.to_str().unwrap(), None).unwrap();

        let bad = write(
            "roundtally_handle_3",
            "other_2023_season.csv",
            "角色,作品,A\nAnn,S,1\n",
        );
        let res = h.reload(bad.to_str().unwrap(), None);
        match res {
            Err(TallyError::Aggregation { source, .. }) => {
                assert_eq!(source, AggregationError::MissingRoundColumns(vec!["B".to_string()]));
            }
            x => panic!("unexpected result {:?}", x),
        }
        let missing = h.reload("/nonexistent/votes_2023_season.csv", None);
        assert!(matches!(missing, Err(TallyError::NotFound { .. })));

        assert_eq!(h.current().unwrap().path, good.to_str().unwrap());
    }
}
