//! Remote card-query fallback.

use std::fmt;

use tracing::{debug, warn};

use crate::card::Card;
use crate::catalog::scryfall::{RawCard, parse_date};
use crate::resolver::sanitize::{ascii_fold, fold_name, sanitize_name};

/// A card service queried when the local catalog has no match.
///
/// Implementations swallow transport failures (logging them) and report
/// them as no match.
pub trait RemoteCardSource: Send + Sync {
    fn find(&self, name: &str, foreign: bool) -> Option<Card>;
}

/// The two queries the staged lookup needs from a card search service.
#[cfg_attr(not(feature = "remote"), allow(dead_code))]
pub(crate) trait SearchTransport {
    type Error: fmt::Display;

    /// Every printing matching the search `query`, all languages when
    /// `foreign` is set.
    fn search(&self, query: &str, foreign: bool) -> Result<Vec<RawCard>, Self::Error>;

    /// Best fuzzy match for `name`, `None` when the service has none.
    fn named_fuzzy(&self, name: &str) -> Result<Option<RawCard>, Self::Error>;
}

/// Exact phrase search, then general search filtered to real name matches,
/// then fuzzy lookup, then fuzzy lookup on the ASCII-folded name. A failing
/// stage is logged and the next one runs.
#[cfg_attr(not(feature = "remote"), allow(dead_code))]
pub(crate) fn staged_find<T: SearchTransport>(transport: &T, name: &str, foreign: bool) -> Option<Card> {
    let name = sanitize_name(name);
    let key = fold_name(&name);

    let exact = format!("!\"{name}\"");
    debug!(%name, foreign, "remote exact search");
    if let Some(hits) = stage(&name, "exact", transport.search(&exact, foreign))
        && let Some(hit) = latest(hits)
    {
        return Some(hit.into());
    }

    debug!(%name, foreign, "remote general search");
    if let Some(hits) = stage(&name, "search", transport.search(&name, foreign)) {
        let matching = hits
            .into_iter()
            .filter(|raw| matches(raw, &key, foreign))
            .collect();
        if let Some(hit) = latest(matching) {
            return Some(hit.into());
        }
    }

    debug!(%name, "remote fuzzy lookup");
    if let Some(Some(hit)) = stage(&name, "fuzzy", transport.named_fuzzy(&name)) {
        return Some(hit.into());
    }

    let folded = ascii_fold(&name);
    if !folded.is_empty() && folded != name {
        debug!(%folded, "remote fuzzy lookup, ascii folded");
        if let Some(Some(hit)) = stage(&name, "fuzzy-ascii", transport.named_fuzzy(&folded)) {
            return Some(hit.into());
        }
    }
    None
}

/// Whether `raw` carries the folded name `key`, on the card or one of its
/// faces. Printed names count only for foreign queries.
fn matches(raw: &RawCard, key: &str, foreign: bool) -> bool {
    let printed = |name: Option<&str>| foreign && name.is_some_and(|name| fold_name(name) == key);
    printed(raw.printed_name.as_deref())
        || fold_name(&raw.name) == key
        || raw
            .card_faces
            .iter()
            .any(|face| fold_name(&face.name) == key || printed(face.printed_name.as_deref()))
}

/// Most recently released hit.
fn latest(cards: Vec<RawCard>) -> Option<RawCard> {
    cards
        .into_iter()
        .max_by_key(|raw| raw.released_at.as_deref().and_then(parse_date))
}

fn stage<T, E: fmt::Display>(name: &str, stage: &str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(%err, name, stage, "remote card query failed");
            None
        }
    }
}

#[cfg(feature = "remote")]
pub use client::ScryfallClient;

#[cfg(feature = "remote")]
mod client {
    use std::fs::File;
    use std::io::{BufWriter, copy};
    use std::path::Path;
    use std::thread;
    use std::time::{Duration, Instant};

    use parking_lot::Mutex;
    use rand::Rng;
    use reqwest::StatusCode;
    use reqwest::blocking::Client;
    use serde::Deserialize;
    use serde::de::DeserializeOwned;
    use tracing::info;

    use super::{RemoteCardSource, SearchTransport, staged_find};
    use crate::card::Card;
    use crate::catalog::scryfall::{RawCard, RawCardList};
    use crate::config::RemoteConfig;
    use crate::error::CatalogError;

    #[derive(Debug, Deserialize)]
    struct BulkDataEntry {
        download_uri: String,
    }

    /// Blocking client for the Scryfall API with a shared call throttle.
    #[derive(Debug)]
    pub struct ScryfallClient {
        http: Client,
        config: RemoteConfig,
        last_call: Mutex<Option<Instant>>,
    }

    impl ScryfallClient {
        pub fn new(config: RemoteConfig) -> Result<Self, CatalogError> {
            let http = Client::builder()
                .user_agent(config.user_agent.clone())
                .timeout(config.timeout)
                .build()
                .map_err(|err| CatalogError::Fetch {
                    url: config.api_base.clone(),
                    reason: err.to_string(),
                })?;
            Ok(Self {
                http,
                config,
                last_call: Mutex::new(None),
            })
        }

        /// Sleeps until `min_delay` plus a random jitter has passed since the
        /// previous call.
        fn throttle(&self) {
            let mut last = self.last_call.lock();
            if let Some(previous) = *last {
                let jitter_ms = self.config.max_jitter.as_millis() as u64;
                let jitter = Duration::from_millis(rand::rng().random_range(0..=jitter_ms));
                let wait = self.config.min_delay + jitter;
                let elapsed = previous.elapsed();
                if elapsed < wait {
                    thread::sleep(wait - elapsed);
                }
            }
            *last = Some(Instant::now());
        }

        /// GET returning `None` on 404, which the API uses for "no match".
        fn get_json<T: DeserializeOwned>(
            &self,
            path: &str,
            query: &[(&str, &str)],
        ) -> reqwest::Result<Option<T>> {
            self.throttle();
            let url = format!("{}{}", self.config.api_base, path);
            let response = self.http.get(&url).query(query).send()?;
            if response.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            response.error_for_status()?.json().map(Some)
        }

        /// Downloads one bulk-data file (for instance `default_cards`) to `dest`.
        pub fn download_bulk(&self, kind: &str, dest: &Path) -> Result<(), CatalogError> {
            let path = format!("/bulk-data/{kind}");
            let fetch_err = |err: reqwest::Error| CatalogError::Fetch {
                url: path.clone(),
                reason: err.to_string(),
            };
            let entry: BulkDataEntry =
                self.get_json(&path, &[])
                    .map_err(fetch_err)?
                    .ok_or_else(|| CatalogError::Fetch {
                        url: path.clone(),
                        reason: "no such bulk data".to_string(),
                    })?;

            info!(kind, url = %entry.download_uri, "downloading bulk card data");
            self.throttle();
            let response = self
                .http
                .get(&entry.download_uri)
                .timeout(self.config.bulk_timeout)
                .send()
                .and_then(|r| r.error_for_status())
                .map_err(fetch_err)?;
            write_body(response, dest)
        }

        pub fn download_sets(&self, dest: &Path) -> Result<(), CatalogError> {
            let url = format!("{}/sets", self.config.api_base);
            info!(%url, "downloading set list");
            self.throttle();
            let response = self
                .http
                .get(&url)
                .send()
                .and_then(|r| r.error_for_status())
                .map_err(|err| CatalogError::Fetch {
                    url: url.clone(),
                    reason: err.to_string(),
                })?;
            write_body(response, dest)
        }
    }

    impl SearchTransport for ScryfallClient {
        type Error = reqwest::Error;

        fn search(&self, query: &str, foreign: bool) -> reqwest::Result<Vec<RawCard>> {
            let mut params = vec![("q", query), ("unique", "prints")];
            if foreign {
                params.push(("include_multilingual", "true"));
            }
            Ok(self
                .get_json::<RawCardList>("/cards/search", &params)?
                .map(|list| list.data)
                .unwrap_or_default())
        }

        fn named_fuzzy(&self, name: &str) -> reqwest::Result<Option<RawCard>> {
            self.get_json("/cards/named", &[("fuzzy", name)])
        }
    }

    impl RemoteCardSource for ScryfallClient {
        fn find(&self, name: &str, foreign: bool) -> Option<Card> {
            staged_find(self, name, foreign)
        }
    }

    fn write_body(mut response: reqwest::blocking::Response, dest: &Path) -> Result<(), CatalogError> {
        let io_err = |source| CatalogError::Io {
            path: dest.display().to_string(),
            source,
        };
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut out = BufWriter::new(File::create(dest).map_err(io_err)?);
        copy(&mut response, &mut out).map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    fn raw(n: u128, value: serde_json::Value) -> RawCard {
        let mut value = value;
        value["id"] = json!(uuid::Uuid::from_u128(n).to_string());
        value["set"] = json!("tst");
        value["collector_number"] = json!(n.to_string());
        serde_json::from_value(value).unwrap()
    }

    type Reply = Result<Vec<RawCard>, String>;

    /// Replays canned replies and records every call.
    #[derive(Default)]
    struct ScriptedTransport {
        searches: RefCell<VecDeque<Reply>>,
        fuzzy: RefCell<VecDeque<Result<Option<RawCard>, String>>>,
        calls: RefCell<Vec<String>>,
    }

    impl SearchTransport for ScriptedTransport {
        type Error = String;

        fn search(&self, query: &str, _foreign: bool) -> Result<Vec<RawCard>, String> {
            self.calls.borrow_mut().push(format!("search {query}"));
            self.searches.borrow_mut().pop_front().unwrap_or(Ok(Vec::new()))
        }

        fn named_fuzzy(&self, name: &str) -> Result<Option<RawCard>, String> {
            self.calls.borrow_mut().push(format!("fuzzy {name}"));
            self.fuzzy.borrow_mut().pop_front().unwrap_or(Ok(None))
        }
    }

    #[test]
    fn test_latest_release_wins_name_tie() {
        let hits = vec![
            raw(1, json!({"name": "Opt", "released_at": "2017-09-29"})),
            raw(2, json!({"name": "Opt", "released_at": "2021-02-05"})),
            raw(3, json!({"name": "Opt"})),
        ];
        let newest = latest(hits).unwrap();
        assert_eq!(newest.released_at.as_deref(), Some("2021-02-05"));
        assert!(latest(Vec::new()).is_none());
    }

    #[test]
    fn test_matches_name_faces_and_printed_names() {
        let opt = raw(1, json!({"name": "Opt"}));
        assert!(matches(&opt, &fold_name("OPT"), false));
        assert!(!matches(&opt, &fold_name("Optimus"), false));

        let split = raw(2, json!({
            "name": "Wear // Tear",
            "card_faces": [{"name": "Wear"}, {"name": "Tear"}]
        }));
        assert!(matches(&split, &fold_name("Tear"), false));

        let bolt = raw(3, json!({"name": "Lightning Bolt", "lang": "de", "printed_name": "Blitzschlag"}));
        let key = fold_name("Blitzschlag");
        assert!(matches(&bolt, &key, true));
        assert!(!matches(&bolt, &key, false));
    }

    #[test]
    fn test_exact_stage_hit_stops_the_cascade() {
        let transport = ScriptedTransport::default();
        transport.searches.borrow_mut().push_back(Ok(vec![
            raw(1, json!({"name": "Opt", "released_at": "2017-09-29"})),
            raw(2, json!({"name": "Opt", "released_at": "2021-02-05"})),
        ]));

        let card = staged_find(&transport, "Opt", false).unwrap();
        assert_eq!(card.id, crate::ids::CardId::from_raw(uuid::Uuid::from_u128(2)));
        assert_eq!(*transport.calls.borrow(), vec!["search !\"Opt\"".to_string()]);
    }

    #[test]
    fn test_general_search_drops_unrelated_hits() {
        let transport = ScriptedTransport::default();
        transport.searches.borrow_mut().extend([
            Ok(Vec::new()),
            Ok(vec![
                raw(1, json!({"name": "Optimus Prime", "released_at": "2022-11-18"})),
                raw(2, json!({"name": "Opt", "released_at": "2017-09-29"})),
            ]),
        ]);

        let card = staged_find(&transport, "Opt", false).unwrap();
        assert_eq!(card.name, "Opt");
        assert_eq!(transport.calls.borrow().len(), 2);
    }

    #[test]
    fn test_failing_stages_fall_through_in_order() {
        let name = "Lim-Dûl's Vault";
        let folded = ascii_fold(name);
        assert_ne!(folded, name);

        let transport = ScriptedTransport::default();
        transport.searches.borrow_mut().extend([
            Err("timed out".to_string()),
            Ok(vec![raw(1, json!({"name": "Vault Skirge"}))]),
        ]);
        transport.fuzzy.borrow_mut().extend([
            Err("connection reset".to_string()),
            Ok(Some(raw(2, json!({"name": "Lim-Dûl's Vault"})))),
        ]);

        let card = staged_find(&transport, name, false).unwrap();
        assert_eq!(card.name, "Lim-Dûl's Vault");
        assert_eq!(
            *transport.calls.borrow(),
            vec![
                format!("search !\"{name}\""),
                format!("search {name}"),
                format!("fuzzy {name}"),
                format!("fuzzy {folded}"),
            ]
        );
    }

    #[test]
    fn test_every_stage_missing_is_no_match() {
        let transport = ScriptedTransport::default();
        assert!(staged_find(&transport, "Opt", false).is_none());
        // "Opt" folds to itself, so the ASCII stage is skipped.
        assert_eq!(transport.calls.borrow().len(), 3);
    }
}
