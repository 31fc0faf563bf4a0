//! End-to-end tests driving `run` against a wiremock data repository

use camino::{Utf8Path, Utf8PathBuf};
use factbook_export::Host;
use serde_json::{Value, json};
use std::fs;
use std::io::{BufRead, Cursor, Write};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test host that captures output to in-memory buffers.
#[derive(Default)]
struct TestHost {
    output_buf: Vec<u8>,
    error_buf: Vec<u8>,
    input_buf: Cursor<Vec<u8>>,
    exit_code: Option<i32>,
}

impl TestHost {
    fn output_str(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }

    fn error_str(&self) -> String {
        String::from_utf8_lossy(&self.error_buf).into_owned()
    }
}

impl Host for TestHost {
    fn output(&mut self) -> impl Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl Write {
        &mut self.error_buf
    }

    fn input(&mut self) -> impl BufRead {
        &mut self.input_buf
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}

const COUNTRIES: &str = "
countries:
  - { code: fr, name: France, region: europe }
  - { code: gm, name: Germany, region: europe }
  - { code: ja, name: Japan, region: east-n-southeast-asia }
";

const FIELDS: &str = "
fields:
  - { json_path: Geography.Climate.text, display_name: Climate, category: Geography }
  - { json_path: People and Society.Population.total.text, display_name: Population, category: People and Society }
";

const PROFILES: &str = "
metadata:
  default_profile: basic
profiles:
  basic:
    description: Climate and population
    fields:
      - Geography.Climate.text
      - People and Society.Population.total.text
  universal:
    description: Every universal field
    fields:
      - all_universal
";

const SETTINGS: &str = "
request_delay_ms: 0
max_retries: 0
";

fn france() -> Value {
    json!({
        "Geography": {
            "Climate": {"text": "generally cool winters and mild summers"},
            "Area": {"total": {"text": "643,801 sq km"}}
        },
        "People and Society": {
            "Population": {"total": {"text": "68,374,591 (2024 est.)"}}
        }
    })
}

fn germany() -> Value {
    json!({
        "Geography": {
            "Climate": {"text": "temperate and marine"}
        }
    })
}

struct Workspace {
    _temp: tempfile::TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp = tempfile::tempdir().expect("Failed to create temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("temp dir should be UTF-8");

        let config = root.join("config");
        fs::create_dir_all(&config).unwrap();
        fs::write(config.join("countries.yaml"), COUNTRIES).unwrap();
        fs::write(config.join("fields.yaml"), FIELDS).unwrap();
        fs::write(config.join("field_profiles.yaml"), PROFILES).unwrap();
        fs::write(config.join("settings.yaml"), SETTINGS).unwrap();

        Self { _temp: temp, root }
    }

    fn config_dir(&self) -> Utf8PathBuf {
        self.root.join("config")
    }

    fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }
}

async fn repository() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/europe/fr.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(france()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/europe/gm.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(germany()))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/east-n-southeast-asia/ja.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    server
}

async fn run(host: &mut TestHost, args: &[&str]) -> factbook_export::Result<()> {
    factbook_export::run(host, core::iter::once("factbook-export").chain(args.iter().copied())).await
}

fn read_json(path: &Utf8Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort")]
async fn test_export_writes_all_formats() {
    let server = repository().await;
    let workspace = Workspace::new();
    let output = workspace.path("out/countries.xlsx");
    let uri = server.uri();

    let mut host = TestHost::default();
    run(
        &mut host,
        &[
            "export",
            "--config-dir",
            workspace.config_dir().as_str(),
            "--base-url",
            uri.as_str(),
            "--color",
            "never",
            "--countries",
            "fr,gm,ja,zz",
            "--output",
            output.as_str(),
            "--csv",
            "--json",
        ],
    )
    .await
    .expect("export should succeed");

    assert!(output.exists());
    assert!(fs::metadata(&output).unwrap().len() > 0);

    assert_eq!(
        read_json(&workspace.path("out/countries.json")),
        json!([
            {
                "Country Code": "FR",
                "Country Name": "France",
                "Climate": "generally cool winters and mild summers",
                "Population": "68,374,591 (2024 est.)"
            },
            {
                "Country Code": "GM",
                "Country Name": "Germany",
                "Climate": "temperate and marine",
                "Population": null
            }
        ])
    );

    let csv = fs::read_to_string(workspace.path("out/countries.csv")).unwrap();
    assert_eq!(
        csv,
        "Country Code,Country Name,Climate,Population\n\
         FR,France,generally cool winters and mild summers,\"68,374,591 (2024 est.)\"\n\
         GM,Germany,temperate and marine,\n"
    );

    let stdout = host.output_str();
    assert!(stdout.contains("Countries exported: 2"), "{stdout}");
    assert!(stdout.contains("Could not fetch 1 country: ja"), "{stdout}");
    assert!(host.error_str().contains("Unknown country codes ignored: zz"));
    assert_eq!(host.exit_code, None);
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort")]
async fn test_export_with_nothing_fetched_writes_nothing() {
    let server = repository().await;
    let workspace = Workspace::new();
    let output = workspace.path("empty.xlsx");
    let uri = server.uri();

    let mut host = TestHost::default();
    let result = run(
        &mut host,
        &[
            "export",
            "--config-dir",
            workspace.config_dir().as_str(),
            "--base-url",
            uri.as_str(),
            "--color",
            "never",
            "--countries",
            "ja",
            "--output",
            output.as_str(),
        ],
    )
    .await;

    assert!(result.is_err());
    assert!(!output.exists());
    assert!(host.error_str().contains("no country data could be retrieved"));
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort")]
async fn test_export_interactive() {
    let server = repository().await;
    let workspace = Workspace::new();
    let output = workspace.path("picked.xlsx");
    let uri = server.uri();

    let mut host = TestHost {
        input_buf: Cursor::new(format!("gm\n{output}\n").into_bytes()),
        ..TestHost::default()
    };

    run(
        &mut host,
        &[
            "export",
            "--config-dir",
            workspace.config_dir().as_str(),
            "--base-url",
            uri.as_str(),
            "--color",
            "never",
            "--interactive",
            "--verbose",
        ],
    )
    .await
    .expect("interactive export should succeed");

    assert!(output.exists());

    let stdout = host.output_str();
    assert!(stdout.contains("Available countries:"), "{stdout}");
    assert!(stdout.contains("Fetching Germany (gm)"), "{stdout}");
    assert!(stdout.contains("Field availability"), "{stdout}");
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort")]
async fn test_analyze_then_catalog_enables_universal_profile() {
    let server = repository().await;
    let workspace = Workspace::new();
    let reports = workspace.path("reports");
    let uri = server.uri();

    let mut host = TestHost::default();
    run(
        &mut host,
        &[
            "analyze",
            "--config-dir",
            workspace.config_dir().as_str(),
            "--base-url",
            uri.as_str(),
            "--color",
            "never",
            "--output-dir",
            reports.as_str(),
        ],
    )
    .await
    .expect("analyze should succeed");

    let detailed: serde_yaml::Value =
        serde_yaml::from_str(&fs::read_to_string(reports.join("coverage_report.yaml")).unwrap()).unwrap();
    assert_eq!(detailed["summary"]["processed_countries"].as_u64(), Some(2));
    assert_eq!(detailed["summary"]["failed_countries"].as_u64(), Some(1));
    assert_eq!(detailed["summary"]["total_unique_fields"].as_u64(), Some(3));
    assert_eq!(
        detailed["fields"]["Geography.Climate.text"]["coverage_pct"].as_f64(),
        Some(100.0)
    );
    assert_eq!(
        detailed["fields"]["Geography.Area.total.text"]["missing_countries"][0].as_str(),
        Some("gm")
    );

    let mut host = TestHost::default();
    run(
        &mut host,
        &[
            "catalog",
            "--config-dir",
            workspace.config_dir().as_str(),
            "--color",
            "never",
            "--input",
            reports.join("coverage_simple.yaml").as_str(),
        ],
    )
    .await
    .expect("catalog should succeed");

    let catalog = workspace.config_dir().join("fields_complete.yaml");
    assert!(catalog.exists());

    let output = workspace.path("universal.xlsx");
    let mut host = TestHost::default();
    run(
        &mut host,
        &[
            "export",
            "--config-dir",
            workspace.config_dir().as_str(),
            "--base-url",
            uri.as_str(),
            "--color",
            "never",
            "--countries",
            "fr,gm",
            "--profile",
            "universal",
            "--output",
            output.as_str(),
            "--json",
        ],
    )
    .await
    .expect("export with the universal profile should succeed");

    assert_eq!(
        read_json(&workspace.path("universal.json")),
        json!([
            {"Country Code": "FR", "Country Name": "France", "Climate": "generally cool winters and mild summers"},
            {"Country Code": "GM", "Country Name": "Germany", "Climate": "temperate and marine"}
        ])
    );

    let mut host = TestHost::default();
    run(
        &mut host,
        &["validate", "--config-dir", workspace.config_dir().as_str(), "--color", "never"],
    )
    .await
    .expect("validate should succeed once the catalog covers every profile field");
}

#[tokio::test]
#[cfg_attr(miri, ignore = "Miri cannot call CreateIoCompletionPort")]
async fn test_init_and_list() {
    let workspace = Workspace::new();
    let target = workspace.path("fresh");

    let mut host = TestHost::default();
    run(&mut host, &["init", "--output-dir", target.as_str(), "--color", "never"])
        .await
        .expect("init should succeed");
    assert!(target.join("countries.yaml").exists());

    let mut host = TestHost::default();
    run(&mut host, &["profiles", "--config-dir", target.as_str(), "--color", "never"])
        .await
        .expect("profiles should succeed");
    assert!(host.output_str().contains("standard (default)"));

    let mut host = TestHost::default();
    run(
        &mut host,
        &["countries", "--config-dir", target.as_str(), "--color", "never", "--region", "europe"],
    )
    .await
    .expect("countries should succeed");
    assert!(host.output_str().contains("fr   France"));
}
