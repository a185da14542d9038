use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use twbmeta_core::config::ExtractorConfig;
use twbmeta_core::writer::{self, FIELDS_FILE, SUMMARY_FILE, WORKSHEETS_FILE};
use twbmeta_core::{ExtractError, Extractor, FormulaTranslator, TranslationError};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const SALES_WORKBOOK: &str = r#"<?xml version='1.0' encoding='utf-8' ?>
<workbook source-build='2023.1.0' version='18.1' xmlns:user='http://www.tableausoftware.com/xml/user'>
  <repository-location id='SalesOverview_16094012345' path='/t/demo/workbooks' revision='1.0' site='demo' />
  <datasources>
    <datasource caption='Superstore' inline='true' name='federated.0x1' version='18.1'>
      <column caption='Gross Sales' datatype='real' name='[Sales]' role='measure' type='quantitative' />
      <column datatype='string' name='[Region]' role='dimension' type='nominal' />
      <column caption='Profit Ratio' datatype='real' name='[Calculation_1]' role='measure' type='quantitative'>
        <calculation class='tableau' formula='SUM([Profit]) / SUM([Sales])' />
      </column>
      <column datatype='real' name='[Profit]' role='measure' type='quantitative' />
    </datasource>
    <datasource caption='Goals' inline='true' name='federated.0x2' version='18.1'>
      <column datatype='string' name='[Region]' role='dimension' type='nominal' />
      <column caption='Quota' datatype='real' name='[Target]' role='measure' type='quantitative' />
      <column caption='Quota Gap' datatype='real' name='[Calculation_2]' role='measure' type='quantitative'>
        <calculation class='tableau' formula='[Target] - [Sales]' />
      </column>
    </datasource>
    <datasource caption='Returns' inline='true' name='federated.0x3' version='18.1'>
      <column datatype='boolean' name='[Returned]' role='dimension' type='nominal' />
    </datasource>
  </datasources>
  <worksheets>
    <worksheet name='Sales by Region'>
      <layout-options>
        <title>
          <formatted-text>
            <run>Sales by Region</run>
          </formatted-text>
        </title>
      </layout-options>
      <table>
        <view>
          <datasources>
            <datasource caption='Superstore' name='federated.0x1' />
          </datasources>
          <datasource-dependencies datasource='federated.0x1'>
            <column datatype='string' name='[Region]' role='dimension' type='nominal' />
            <column caption='Gross Sales' datatype='real' name='[Sales]' role='measure' type='quantitative' />
            <column caption='Profit Ratio' datatype='real' name='[Calculation_1]' role='measure' type='quantitative'>
              <calculation class='tableau' formula='SUM([Profit]) / SUM([Sales])' />
            </column>
            <column-instance column='[Region]' derivation='None' name='[none:Region:nk]' pivot='key' type='nominal' />
          </datasource-dependencies>
          <slices>
            <column>[federated.0x1].[none:Region:nk]</column>
          </slices>
        </view>
        <panes>
          <pane selection-relaxation-option='selection-relaxation-allow'>
            <mark class='Bar' />
          </pane>
        </panes>
        <rows>[federated.0x1].[none:Region:nk]</rows>
        <cols>[federated.0x1].[sum:Sales:qk]</cols>
      </table>
    </worksheet>
    <worksheet name='Quota Attainment'>
      <table>
        <view>
          <datasource-dependencies datasource='federated.0x2'>
            <column caption='Quota' datatype='real' name='[Target]' role='measure' type='quantitative' />
            <column caption='Quota Gap' datatype='real' name='[Calculation_2]' role='measure' type='quantitative'>
              <calculation class='tableau' formula='[Target] - [Sales]' />
            </column>
          </datasource-dependencies>
        </view>
        <panes><pane><mark class='Line' /></pane></panes>
        <rows />
        <cols>[federated.0x2].[Calculation_2]</cols>
      </table>
    </worksheet>
    <worksheet name='Returns Detail'>
      <table>
        <view>
          <datasource-dependencies datasource='federated.0x3'>
            <column datatype='boolean' name='[Returned]' role='dimension' type='nominal' />
          </datasource-dependencies>
        </view>
        <panes><pane><mark class='Circle' /></pane></panes>
        <rows>[federated.0x3].[none:Returned:nk]</rows>
        <cols />
      </table>
    </worksheet>
    <worksheet name='Scratch'>
      <table>
        <view />
        <rows />
        <cols />
      </table>
    </worksheet>
    <worksheet name='Trend'>
      <table>
        <view>
          <datasource-dependencies datasource='federated.0x1'>
            <column caption='Gross Sales' datatype='real' name='[Sales]' role='measure' type='quantitative' />
          </datasource-dependencies>
          <datasource-dependencies datasource='federated.0x2'>
            <column caption='Quota' datatype='real' name='[Target]' role='measure' type='quantitative' />
          </datasource-dependencies>
        </view>
        <panes><pane><mark class='Area' /></pane></panes>
      </table>
    </worksheet>
  </worksheets>
  <dashboards>
    <dashboard name='Overview'>
      <datasources>
        <datasource caption='Superstore' name='federated.0x1' />
      </datasources>
      <datasource-dependencies datasource='federated.0x1'>
        <column datatype='string' name='[Region]' role='dimension' type='nominal' />
        <column caption='Gross Sales' datatype='real' name='[Sales]' role='measure' type='quantitative' />
      </datasource-dependencies>
      <zones>
        <zone h='100000' id='4' type-v2='layout-basic' w='100000' x='0' y='0'>
          <zone h='50000' id='1' name='Sales by Region' w='100000' x='0' y='0' />
          <zone h='50000' id='2' name='Quota Attainment' w='100000' x='0' y='50000' />
        </zone>
      </zones>
    </dashboard>
    <dashboard name='Detail'>
      <datasource-dependencies datasource='federated.0x3'>
        <column datatype='boolean' name='[Returned]' role='dimension' type='nominal' />
      </datasource-dependencies>
      <datasource-dependencies datasource='federated.0x2'>
        <column caption='Quota' datatype='real' name='[Target]' role='measure' type='quantitative' />
      </datasource-dependencies>
      <zones>
        <zone h='100000' id='5' type-v2='layout-basic' w='100000' x='0' y='0'>
          <zone h='50000' id='6' name='Returns Detail' w='100000' x='0' y='0' />
          <zone h='50000' id='7' name='Sales by Region' w='100000' x='0' y='50000' />
        </zone>
      </zones>
    </dashboard>
  </dashboards>
</workbook>
"#;

const MINIMAL_WORKBOOK: &str = r#"<?xml version='1.0' encoding='utf-8' ?>
<workbook version='18.1'>
  <worksheets>
    <worksheet name='Sheet 1'>
      <table><view /><rows>[Number of Records]</rows><cols /></table>
    </worksheet>
  </worksheets>
</workbook>
"#;

fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

// Helper to create a packaged workbook with the given entries
fn create_mock_twbx(path: &Path, entries: &[(&str, &[u8])]) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for (name, content) in entries {
        zip.start_file(*name, options)?;
        zip.write_all(content)?;
    }
    zip.finish()?;
    Ok(())
}

#[test]
fn test_summary_counts() -> anyhow::Result<()> {
    let extraction = Extractor::new().extract_bytes("sales.twb", SALES_WORKBOOK.as_bytes())?;

    assert_eq!(extraction.summary.len(), 1);
    let summary = &extraction.summary[0];
    assert_eq!(summary.workbook_name, "SalesOverview");
    assert_eq!(summary.counts(), (2, 3, 5, 2, 4));
    Ok(())
}

#[test]
fn test_worksheet_records() -> anyhow::Result<()> {
    let extraction = Extractor::new().extract_bytes("sales.twb", SALES_WORKBOOK.as_bytes())?;
    let sheets = &extraction.worksheets;
    assert_eq!(sheets.len(), 5);
    assert!(sheets.iter().all(|s| s.workbook_name == "SalesOverview"));

    let sales = &sheets[0];
    assert_eq!(sales.worksheet_name, "Sales by Region");
    assert_eq!(sales.dashboard_name, "Detail");
    assert_eq!(sales.title, "Sales by Region");
    assert_eq!(sales.data_source, "Superstore");
    assert_eq!(sales.fields, "Region, Gross Sales, Profit Ratio");
    assert_eq!(sales.slices, "[Superstore].[none:Region:nk]");
    assert_eq!(sales.rows, "Superstore.none:Region:nk");
    assert_eq!(sales.columns, "Superstore.sum:Gross Sales:qk");
    assert_eq!(sales.chart_type, "Bar");

    let quota = &sheets[1];
    assert_eq!(quota.dashboard_name, "Overview");
    assert_eq!(quota.data_source, "Goals");
    assert_eq!(quota.rows, "No Rows");
    assert_eq!(quota.columns, "Goals.Quota Gap");
    assert_eq!(quota.title, "No Title");
    assert!(!quota.columns.contains("federated.0x2"));
    assert!(!quota.columns.contains("Calculation_2"));

    let returns = &sheets[2];
    assert_eq!(returns.dashboard_name, "Detail");
    assert_eq!(returns.rows, "Returns.none:Returned:nk");
    assert_eq!(returns.columns, "No Columns");
    assert_eq!(returns.chart_type, "Circle");

    let scratch = &sheets[3];
    assert_eq!(scratch.dashboard_name, "No Dashboard");
    assert_eq!(scratch.data_source, "No Data Source");
    assert_eq!(scratch.fields, "No Fields");
    assert_eq!(scratch.slices, "No Slices");
    assert_eq!(scratch.chart_type, "Unknown");

    let trend = &sheets[4];
    assert_eq!(trend.data_source, "Goals");
    assert_eq!(trend.fields, "Gross Sales, Quota");
    Ok(())
}

#[test]
fn test_field_records() -> anyhow::Result<()> {
    let extraction = Extractor::new().extract_bytes("sales.twb", SALES_WORKBOOK.as_bytes())?;
    let fields = &extraction.fields;

    let names: Vec<_> = fields.iter().map(|f| f.column_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "Sales",
            "Region",
            "Calculation_1",
            "Profit",
            "Target",
            "Calculation_2",
            "Returned"
        ]
    );

    let region = &fields[1];
    assert_eq!(region.datasource_caption, "Superstore");
    assert_eq!(region.datatype, "string");

    let ratio = &fields[2];
    assert_eq!(ratio.column_caption, "Profit Ratio");
    // The worksheet re-declaration is resolved once [Profit] is known
    assert_eq!(ratio.formula, "SUM(Profit) / SUM(Gross Sales)");
    assert!(ratio.is_calculated);

    let gap = &fields[5];
    assert_eq!(gap.datasource_caption, "Goals");
    assert_eq!(gap.formula, "Quota - Gross Sales");

    assert_eq!(fields[6].datasource_caption, "Returns");
    assert_eq!(fields.iter().filter(|f| f.is_calculated).count(), 2);
    Ok(())
}

#[test]
fn test_workbook_without_datasources() -> anyhow::Result<()> {
    let extraction = Extractor::new().extract_bytes("minimal.twb", MINIMAL_WORKBOOK.as_bytes())?;
    assert_eq!(extraction.worksheets.len(), 1);
    let sheet = &extraction.worksheets[0];
    assert_eq!(sheet.data_source, "No Data Source");
    assert_eq!(sheet.rows, "Number of Records");
    assert_eq!(sheet.workbook_name, "Unknown Workbook");
    assert_eq!(extraction.summary[0].counts(), (0, 0, 1, 0, 0));
    Ok(())
}

#[test]
fn test_workbook_name_from_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Regional Review.twb");
    write_file(&path, MINIMAL_WORKBOOK)?;

    let mut config = ExtractorConfig::default();
    config.global.workbook_name_from_file = true;
    let extraction = Extractor::with_config(config).extract_file(&path)?;
    assert_eq!(extraction.summary[0].workbook_name, "Regional Review");
    assert_eq!(extraction.worksheets[0].workbook_name, "Regional Review");

    // Repository location takes precedence over the file name
    let path = dir.path().join("renamed.twb");
    write_file(&path, SALES_WORKBOOK)?;
    let mut config = ExtractorConfig::default();
    config.global.workbook_name_from_file = true;
    let extraction = Extractor::with_config(config).extract_file(&path)?;
    assert_eq!(extraction.summary[0].workbook_name, "SalesOverview");
    Ok(())
}

#[test]
fn test_packaged_workbook() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("sales.twbx");
    create_mock_twbx(
        &path,
        &[
            ("Data/Extracts/federated.hyper", b"not a workbook"),
            ("Sales Overview.twb", SALES_WORKBOOK.as_bytes()),
        ],
    )?;

    let extraction = Extractor::new().extract_file(&path)?;
    assert_eq!(extraction.worksheets.len(), 5);
    assert_eq!(extraction.summary[0].counts(), (2, 3, 5, 2, 4));

    let empty = dir.path().join("empty.twbx");
    create_mock_twbx(&empty, &[("Data/readme.txt", b"nothing here")])?;
    let err = Extractor::new().extract_file(&empty).unwrap_err();
    assert!(matches!(err, ExtractError::MissingWorkbook { .. }));
    assert!(err.document().ends_with("empty.twbx"));
    Ok(())
}

#[test]
fn test_batch_isolates_failures() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let good = dir.path().join("good.twb");
    let broken = dir.path().join("broken.twb");
    let minimal = dir.path().join("minimal.twb");
    let missing = dir.path().join("missing.twb");
    write_file(&good, SALES_WORKBOOK)?;
    write_file(&broken, "<workbook><worksheets></workbook>")?;
    write_file(&minimal, MINIMAL_WORKBOOK)?;

    for parallel in [false, true] {
        let mut config = ExtractorConfig::default();
        config.global.parallel = parallel;
        let batch = Extractor::with_config(config).extract_batch(&[&good, &broken, &minimal, &missing]);

        assert_eq!(batch.summaries.len(), 2);
        assert_eq!(batch.summaries[0].workbook_name, "SalesOverview");
        assert_eq!(batch.summaries[1].workbook_name, "Unknown Workbook");
        assert_eq!(batch.worksheets.len(), 6);
        assert_eq!(batch.fields.len(), 7);

        assert_eq!(batch.documents.len(), 2);
        assert!(batch.documents[0].document.ends_with("good.twb"));
        assert_eq!(batch.documents[0].worksheets, 0..5);
        assert!(batch.documents[1].document.ends_with("minimal.twb"));
        assert_eq!(batch.documents[1].worksheets, 5..6);
        assert_eq!(batch.document_worksheets(&batch.documents[1])[0].worksheet_name, "Sheet 1");

        assert_eq!(batch.failures.len(), 2);
        assert!(matches!(batch.failures[0], ExtractError::Xml { .. }));
        assert!(batch.failures[0].document().ends_with("broken.twb"));
        assert!(matches!(batch.failures[1], ExtractError::Io { .. }));
        assert!(batch.failures[1].document().ends_with("missing.twb"));
    }
    Ok(())
}

#[test]
fn test_csv_export_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("sales.twb");
    write_file(&input, SALES_WORKBOOK)?;

    let batch = Extractor::new().extract_batch(&[&input]);
    let out_dir = dir.path().join("out");
    let written = writer::write_tables_to_dir(&out_dir, &batch, None, b',')?;
    assert_eq!(written.len(), 3);

    let read_rows = |name: &str| -> anyhow::Result<Vec<Vec<String>>> {
        let content = fs::read_to_string(out_dir.join(name))?;
        let mut reader = csv::Reader::from_reader(content.as_bytes());
        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record?.iter().map(str::to_string).collect());
        }
        Ok(rows)
    };

    use twbmeta_core::records::TableRow;
    let worksheets = read_rows(WORKSHEETS_FILE)?;
    assert_eq!(worksheets.len(), batch.worksheets.len());
    for (row, record) in worksheets.iter().zip(&batch.worksheets) {
        assert_eq!(row, &record.cells());
    }

    let fields = read_rows(FIELDS_FILE)?;
    assert_eq!(fields.len(), batch.fields.len());
    for (row, record) in fields.iter().zip(&batch.fields) {
        assert_eq!(row, &record.cells());
    }

    let summary = read_rows(SUMMARY_FILE)?;
    assert_eq!(summary, vec![batch.summaries[0].cells()]);
    Ok(())
}

struct EchoTranslator;

impl FormulaTranslator for EchoTranslator {
    fn translate(&self, formula: &str) -> Result<String, TranslationError> {
        if formula.contains("SUM(Profit)") {
            Err(TranslationError::Request("connection reset".to_string()))
        } else {
            Ok(format!("CALCULATE({})", formula))
        }
    }
}

#[test]
fn test_translation_stage() -> anyhow::Result<()> {
    let extractor = Extractor::new();
    let extraction = extractor.extract_bytes("sales.twb", SALES_WORKBOOK.as_bytes())?;
    let translated = extractor.translate(&extraction.fields, &EchoTranslator);

    assert_eq!(translated.len(), 2);
    assert_eq!(translated[0].column_caption, "Profit Ratio");
    assert_eq!(translated[0].translated, "Error: request failed: connection reset");
    assert_eq!(translated[1].column_caption, "Quota Gap");
    assert_eq!(translated[1].translated, "CALCULATE(Quota - Gross Sales)");
    Ok(())
}
