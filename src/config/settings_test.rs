// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::*;

fn defaults() -> Settings {
    Settings::builder()
        .unwrap()
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap()
}

#[test]
fn test_defaults_match_pipeline_limits() {
    let settings = defaults();

    assert_eq!(settings.worker.max_candidates, 20);
    assert_eq!(settings.worker.page_concurrency, 5);
    assert_eq!(settings.worker.link_concurrency, 10);
    assert_eq!(settings.http.page_timeout(), Duration::from_secs(10));
    assert_eq!(settings.http.probe_timeout(), Duration::from_secs(5));
    assert_eq!(settings.http.probe_max_redirects, 2);
    assert_eq!(settings.serp.depth, 30);
    assert_eq!(settings.queue.backend, QueueBackend::Postgres);
    assert_eq!(settings.queue.name, "crawl-jobs");
}

#[test]
fn test_default_blocklist_is_loaded_when_filter_section_missing() {
    let settings = defaults();

    assert_eq!(
        settings.filter.blocked_domains.len(),
        DEFAULT_BLOCKED_DOMAINS.len()
    );
    assert!(settings
        .filter
        .blocked_domains
        .contains(&"facebook.com".to_string()));
}

#[test]
fn test_overrides_and_extra_regions() {
    let settings: Settings = Settings::builder()
        .unwrap()
        .set_override("worker.max_candidates", 5)
        .unwrap()
        .set_override("queue.backend", "redis")
        .unwrap()
        .set_override("serp.regions.uk.location_code", 2826)
        .unwrap()
        .set_override("serp.regions.uk.language_code", "en")
        .unwrap()
        .build()
        .unwrap()
        .try_deserialize()
        .unwrap();

    assert_eq!(settings.worker.max_candidates, 5);
    assert_eq!(settings.queue.backend, QueueBackend::Redis);
    assert_eq!(
        settings.serp.regions.get("uk"),
        Some(&RegionSettings {
            location_code: 2826,
            language_code: "en".to_string(),
        })
    );
}
