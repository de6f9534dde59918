use anyhow::{Context, Result};
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use shorts_core::{
    compare_groups, merge_title_hashtags, partition, AliasIndex, Dataset, GroupComparison,
    HashtagStats, PartitionSummary,
};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::store;
use crate::wiki::{extract_intro, fix_group_info, GroupWikiInfo, PageSource, WikiFetcher, WikiInfoMap, WikiStats};
use crate::youtube::{parse_channel_handle, YouTubeClient};

/// Outcome of a shorts fetch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchSummary {
    pub groups: usize,
    pub saved: usize,
    pub skipped: usize,
    pub shorts: usize,
    pub total_time: Duration,
}

impl FetchSummary {
    pub fn summary(&self) -> String {
        format!(
            "Fetched {} shorts for {} of {} groups ({} skipped) in {:.2}s",
            self.shorts,
            self.saved,
            self.groups,
            self.skipped,
            self.total_time.as_secs_f64()
        )
    }
}

/// Runs the dataset jobs against the configured files
pub struct DatasetProcessor {
    config: Config,
}

impl DatasetProcessor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Split the dataset into challenge and non-challenge files.
    ///
    /// The alias index is built before anything is read or written, so a
    /// roster error leaves both outputs untouched.
    pub async fn split(&self) -> Result<PartitionSummary> {
        let start_time = Instant::now();
        let paths = &self.config.paths;
        let strategy = self.config.classifier.strategy;

        info!("🚀 Splitting shorts with the {} strategy", strategy);

        let index = if strategy.needs_roster() {
            let roster_path = paths.roster_path();
            let roster = store::load_roster(&roster_path).await?;
            let index = AliasIndex::build(&roster)
                .with_context(|| format!("Cannot build alias index from {}", roster_path.display()))?;
            info!("📚 {}", index.stats().summary());
            Some(index)
        } else {
            None
        };

        let dataset = store::load_dataset(&paths.dataset_path()).await?;
        info!("📁 Loaded {} groups, {} shorts", dataset.len(), dataset.total_shorts());

        let classifier = strategy.build(index.as_ref(), &self.config.classifier.keyword)?;
        let result = partition(&dataset, &*classifier);

        store::save_dataset(&paths.challenge_path(), &result.challenge).await?;
        store::save_dataset(&paths.non_challenge_path(), &result.non_challenge).await?;

        info!("✅ Challenge shorts: {} -> {}", result.summary.challenge_total, paths.challenge_path().display());
        info!(
            "📦 Non-challenge shorts: {} -> {}",
            result.summary.non_challenge_total,
            paths.non_challenge_path().display()
        );
        debug!("{}", result.summary.summary());
        info!("🎉 Split completed in {:.2}s", start_time.elapsed().as_secs_f64());

        Ok(result.summary)
    }

    /// Add hashtags found in titles to each short's hashtag list
    pub async fn merge_hashtags(&self, input: &Path, output: &Path) -> Result<HashtagStats> {
        let mut dataset = store::load_dataset(input).await?;
        let stats = merge_title_hashtags(&mut dataset);
        store::save_dataset(output, &dataset).await?;

        info!("🏷️ {}", stats.summary());
        info!("💾 Saved processed data to {}", output.display());
        Ok(stats)
    }

    /// Compare dataset group keys with the group CSV
    pub async fn compare(&self, dataset_path: &Path, groups_path: &Path) -> Result<GroupComparison> {
        let dataset = store::load_dataset(dataset_path).await?;
        let groups = store::load_groups(groups_path).await?;

        let comparison = compare_groups(
            dataset.keys().map(String::as_str),
            groups.iter().map(|g| g.english.as_str()),
        );

        info!("📊 {}", comparison.summary());
        Ok(comparison)
    }

    fn min_upload_time(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.config.youtube.min_upload_date.and_time(NaiveTime::MIN))
    }

    /// Fetch shorts for every group with a channel id, saving after each group
    pub async fn fetch_shorts(&self, groups_path: &Path, output: &Path) -> Result<FetchSummary> {
        let start_time = Instant::now();
        let client = YouTubeClient::new(&self.config.youtube, self.config.require_api_key()?);
        let groups = store::load_groups(groups_path).await?;
        let min_date = self.min_upload_time();

        info!("🔍 Found {} groups in {}", groups.len(), groups_path.display());

        let mut summary = FetchSummary {
            groups: groups.len(),
            ..FetchSummary::default()
        };

        for group in &groups {
            match client.fetch_group(group, min_date).await {
                Some(entry) => {
                    summary.saved += 1;
                    summary.shorts += entry.shorts_count;

                    let mut update = Dataset::new();
                    update.insert(group.english.clone(), entry);
                    store::merge_into_file(output, update).await?;
                    info!("💾 Saved shorts data for {}", group.english);
                }
                None => summary.skipped += 1,
            }
        }

        summary.total_time = start_time.elapsed();
        info!("🎉 {}", summary.summary());
        Ok(summary)
    }

    /// Fill the `channel id` column from channel handles
    pub async fn resolve_channels(&self, input: &Path, output: &Path) -> Result<usize> {
        let client = YouTubeClient::new(&self.config.youtube, self.config.require_api_key()?);
        let mut groups = store::load_groups(input).await?;
        let mut resolved = 0;

        for group in &mut groups {
            let Some(handle) = group.youtube.as_deref().and_then(parse_channel_handle) else {
                debug!("No usable channel handle for {}", group.english);
                continue;
            };

            match client.channel_id_for_handle(&handle).await {
                Ok(Some(channel_id)) => {
                    info!("Found channel ID for {}: {}", group.english, channel_id);
                    group.channel_id = Some(channel_id);
                    resolved += 1;
                }
                Ok(None) => warn!("Could not find channel ID for {}", group.english),
                Err(e) => warn!("Error getting channel ID for {}: {}", handle, e),
            }
        }

        store::save_groups(output, &groups).await?;
        info!("✅ Updated {} channel IDs. Results saved to {}", resolved, output.display());
        Ok(resolved)
    }

    /// Fetch and extract the article intro of every group
    pub async fn fetch_wiki<S: PageSource>(
        &self,
        fetcher: &WikiFetcher<S>,
        groups_path: &Path,
        output_dir: &Path,
    ) -> Result<WikiStats> {
        let groups = store::load_groups(groups_path).await?;
        fs::create_dir_all(output_dir).await?;

        let delay = Duration::from_millis(self.config.wiki.request_delay_ms);
        let mut results = WikiInfoMap::new();
        let mut stats = WikiStats::default();

        for (i, group) in groups.iter().enumerate() {
            info!("🔍 Fetching info for {}...", group.english);

            let entry = match fetcher.fetch_group(group).await {
                Some(page) => {
                    if self.config.wiki.save_raw_html {
                        let file_name = format!("{}_wiki.html", group.english.replace([' ', '/'], "_"));
                        fs::write(output_dir.join(file_name), &page.html).await?;
                    }

                    GroupWikiInfo {
                        info: extract_intro(&page.html),
                        name_used: Some(page.name_used),
                        url: Some(page.url),
                    }
                }
                None => {
                    warn!("No article found for {}", group.english);
                    GroupWikiInfo::default()
                }
            };

            stats.record(entry.name_used);
            results.insert(group.english.clone(), entry);

            if !delay.is_zero() && i + 1 < groups.len() {
                tokio::time::sleep(delay).await;
            }
        }

        let info_path = output_dir.join(&self.config.wiki.info_file);
        store::save_json(&info_path, &results).await?;

        info!("💾 Data saved to {}", info_path.display());
        info!("📊 {}", stats.summary());
        Ok(stats)
    }

    /// Repair glued words in a stored intro file, in place
    pub async fn fix_wiki(&self, input: &Path) -> Result<usize> {
        let mut groups: WikiInfoMap = store::load_json(input).await?;
        let changed = fix_group_info(&mut groups);
        store::save_json(input, &groups).await?;

        info!("✅ Fixed {} paragraphs in {}", changed, input.display());
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::wiki::NameUsed;
    use async_trait::async_trait;
    use shorts_core::ClassifierKind;
    use std::collections::HashMap;
    use tempfile::TempDir;

    const ROSTER_CSV: &str = "\
name (english),name (korean),group (english),group (korean)
Karina,카리나,aespa,에스파
Yeji,예지,ITZY,있지
Wonyoung,장원영,IVE,아이브
";

    const GROUPS_CSV: &str = "\
group (english),group (korean),group (alternative),youtube,channel id
aespa,에스파,,https://www.youtube.com/shorts/abc,
ITZY,있지,Itzy (group),,
";

    const DATASET_JSON: &str = r##"{
      "aespa": {
        "korean_name": "에스파",
        "channel_id": "UC1",
        "channel_url": "https://www.youtube.com/@aespa",
        "shorts_count": 3,
        "shorts": [
          { "video_id": "a1", "title": "with #Yeji", "hashtags": ["#aespa", "#WhiplashChallenge"] },
          { "video_id": "a2", "title": "", "hashtags": ["#aespa", "#karina"] },
          { "video_id": "a3", "title": "", "hashtags": ["#karina", "#wonyoung"] }
        ]
      },
      "NMIXX": {
        "korean_name": "엔믹스",
        "channel_id": "UC2",
        "channel_url": "",
        "shorts_count": 0,
        "shorts": []
      }
    }"##;

    async fn setup(strategy: ClassifierKind) -> (TempDir, DatasetProcessor) {
        let dir = TempDir::new().unwrap();
        let config = ConfigBuilder::new()
            .with_data_dir(dir.path().to_path_buf())
            .with_strategy(strategy)
            .with_api_key("test-key".to_string())
            .without_delays()
            .build();

        fs::write(config.paths.roster_path(), ROSTER_CSV).await.unwrap();
        fs::write(config.paths.groups_path(), GROUPS_CSV).await.unwrap();
        fs::write(config.paths.dataset_path(), DATASET_JSON).await.unwrap();

        (dir, DatasetProcessor::new(config))
    }

    #[tokio::test]
    async fn test_roster_split_writes_both_files() {
        let (_dir, processor) = setup(ClassifierKind::Roster).await;

        let summary = processor.split().await.unwrap();
        assert_eq!(summary.challenge_total, 1);
        assert_eq!(summary.non_challenge_total, 2);

        let paths = &processor.config().paths;
        let challenge = store::load_dataset(&paths.challenge_path()).await.unwrap();
        let non_challenge = store::load_dataset(&paths.non_challenge_path()).await.unwrap();

        assert_eq!(challenge.get("aespa").unwrap().shorts[0].video_id, "a3");
        assert_eq!(non_challenge.get("aespa").unwrap().shorts_count, 2);
        assert!(!challenge.contains("NMIXX"));
        assert!(!non_challenge.contains("NMIXX"));
    }

    #[tokio::test]
    async fn test_keyword_split_needs_no_roster() {
        let (_dir, processor) = setup(ClassifierKind::Keyword).await;
        fs::remove_file(processor.config().paths.roster_path()).await.unwrap();

        let summary = processor.split().await.unwrap();
        assert_eq!(summary.strategy, "keyword");
        assert_eq!(summary.challenge_total, 1);
    }

    #[tokio::test]
    async fn test_split_aborts_on_roster_error() {
        let (_dir, processor) = setup(ClassifierKind::Global).await;
        let paths = processor.config().paths.clone();
        fs::write(
            paths.roster_path(),
            "name (english),name (korean),group (english),group (korean)\nKarina,카리나,aespa,\n",
        )
        .await
        .unwrap();

        assert!(processor.split().await.is_err());
        assert!(!paths.challenge_path().exists());
        assert!(!paths.non_challenge_path().exists());
    }

    #[tokio::test]
    async fn test_merge_hashtags_job() {
        let (dir, processor) = setup(ClassifierKind::Roster).await;
        let output = dir.path().join("processed.json");

        let stats = processor
            .merge_hashtags(&processor.config().paths.dataset_path(), &output)
            .await
            .unwrap();
        assert_eq!(stats.hashtags_added, 1);

        let processed = store::load_dataset(&output).await.unwrap();
        assert_eq!(processed.get("aespa").unwrap().shorts[0].hashtags, ["#aespa", "#WhiplashChallenge", "#Yeji"]);
    }

    #[tokio::test]
    async fn test_compare_job() {
        let (_dir, processor) = setup(ClassifierKind::Roster).await;
        let paths = &processor.config().paths;

        let comparison = processor.compare(&paths.dataset_path(), &paths.groups_path()).await.unwrap();
        assert_eq!(comparison.in_both, ["aespa"]);
        assert_eq!(comparison.only_in_dataset, ["NMIXX"]);
        assert_eq!(comparison.only_in_csv, ["ITZY"]);
    }

    #[tokio::test]
    async fn test_fetch_shorts_requires_api_key() {
        let dir = TempDir::new().unwrap();
        let mut config = ConfigBuilder::new().with_data_dir(dir.path().to_path_buf()).build();
        config.youtube.api_key = None;
        let processor = DatasetProcessor::new(config);

        let paths = &processor.config().paths;
        assert!(processor.fetch_shorts(&paths.groups_path(), &paths.raw_dataset_path()).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_shorts_skips_groups_without_channel() {
        let (_dir, processor) = setup(ClassifierKind::Roster).await;
        let paths = &processor.config().paths;

        let summary = processor
            .fetch_shorts(&paths.groups_path(), &paths.raw_dataset_path())
            .await
            .unwrap();
        assert_eq!(summary.groups, 2);
        assert_eq!(summary.skipped, 2);
        assert!(!paths.raw_dataset_path().exists());
    }

    #[tokio::test]
    async fn test_resolve_channels_without_handles() {
        let (dir, processor) = setup(ClassifierKind::Roster).await;
        let output = dir.path().join("groups-updated.csv");

        let resolved = processor
            .resolve_channels(&processor.config().paths.groups_path(), &output)
            .await
            .unwrap();
        assert_eq!(resolved, 0);

        let groups = store::load_groups(&output).await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].alternative.as_deref(), Some("Itzy (group)"));
    }

    struct StaticPages(HashMap<String, String>);

    #[async_trait]
    impl PageSource for StaticPages {
        async fn fetch(&self, url: &str) -> Result<Option<String>> {
            Ok(self.0.get(url).cloned())
        }
    }

    #[tokio::test]
    async fn test_fetch_wiki_and_fix() {
        let (dir, processor) = setup(ClassifierKind::Roster).await;
        let output_dir = dir.path().join("wiki");

        let html = r#"<div id="mw-content-text"><div class="mw-parser-output">
            <table class="infobox"><tr><td>x</td></tr></table>
            <p>ITZY is a South Korean girlgroup.</p><h2>History</h2></div></div>"#;
        let pages = HashMap::from([("https://en.wikipedia.org/wiki/Itzy_%28group%29".to_string(), html.to_string())]);
        let fetcher = WikiFetcher::new(StaticPages(pages), &processor.config().wiki.base_url);

        let stats = processor
            .fetch_wiki(&fetcher, &processor.config().paths.groups_path(), &output_dir)
            .await
            .unwrap();
        assert_eq!(stats.alternative, 1);
        assert_eq!(stats.failed, 1);
        assert!(output_dir.join("ITZY_wiki.html").exists());

        let info_path = output_dir.join("kpop_group_info.json");
        let stored: WikiInfoMap = store::load_json(&info_path).await.unwrap();
        assert_eq!(stored["aespa"], GroupWikiInfo::default());
        assert_eq!(stored["ITZY"].name_used, Some(NameUsed::Alternative));

        assert_eq!(processor.fix_wiki(&info_path).await.unwrap(), 1);
        let fixed: WikiInfoMap = store::load_json(&info_path).await.unwrap();
        assert_eq!(fixed["ITZY"].info.as_ref().unwrap()[0], "ITZY is a South Korean girl group.");
    }
}
