use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use twbrs::{ActionType, LodType, ParseError, WorkbookParser, parse_workbook};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

fn workbook(body: &str) -> String {
    format!(
        "<?xml version='1.0' encoding='utf-8' ?>\n<workbook version='18.1'>\n{}\n</workbook>",
        body
    )
}

// Helper to package workbook documents (and other members) as a .twbx archive
fn create_twbx(path: &Path, members: &[(&str, &str)]) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    for (name, content) in members {
        zip.start_file(*name, options)?;
        zip.write_all(content.as_bytes())?;
    }

    zip.finish()?;
    Ok(())
}

#[test]
fn test_simple_calculated_field() {
    let xml = workbook(
        r#"<worksheets>
            <worksheet name='Profitability'>
                <table>
                    <view>
                        <datasource-dependencies datasource='federated.1'>
                            <column name='[Profit Ratio]' datatype='real' role='measure'>
                                <calculation class='tableau' formula='SUM([Profit])/SUM([Sales])'/>
                            </column>
                        </datasource-dependencies>
                    </view>
                </table>
            </worksheet>
        </worksheets>"#,
    );

    let metadata = WorkbookParser::new().parse_str(&xml, "calc").unwrap();
    assert_eq!(metadata.worksheets.len(), 1);

    let fields = &metadata.worksheets[0].calculated_fields;
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].name, "Profit Ratio");
    assert!(!fields[0].is_lod);
    assert_eq!(fields[0].lod_type, None);
    assert_eq!(fields[0].lod_scope, None);
}

#[test]
fn test_fixed_lod_field() {
    let xml = workbook(
        r#"<worksheets>
            <worksheet name='Regions'>
                <column name='[Regional Sales]'>
                    <calculation class='tableau' formula='{FIXED [Region] : SUM([Sales])}'/>
                </column>
            </worksheet>
        </worksheets>"#,
    );

    let metadata = WorkbookParser::new().parse_str(&xml, "lod").unwrap();
    let field = &metadata.worksheets[0].calculated_fields[0];
    assert!(field.is_lod);
    assert_eq!(field.lod_type, Some(LodType::Fixed));
    assert_eq!(field.lod_scope, Some(vec!["Region".to_string()]));
}

#[test]
fn test_dashboard_filter_action() {
    let xml = workbook(
        r#"<dashboards>
            <dashboard name='Sales Dashboard'>
                <zones>
                    <zone id='1' type='layout-basic' name='Map' x='0' y='0' w='800' h='600'/>
                    <zone id='2' type='layout-basic' name='Details' x='800' y='0' w='400' h='600'/>
                </zones>
                <actions>
                    <filter-action name='Region Filter'>
                        <source><worksheet name='Map'/></source>
                        <target><worksheet name='Details'/></target>
                        <filter><field name='[Region]'/></filter>
                    </filter-action>
                </actions>
            </dashboard>
        </dashboards>"#,
    );

    let metadata = WorkbookParser::new().parse_str(&xml, "actions").unwrap();
    let dashboard = metadata.get_dashboard("Sales Dashboard").unwrap();

    assert_eq!(dashboard.layout_containers.len(), 2);
    assert_eq!(
        dashboard.layout_containers[0].worksheet_name.as_deref(),
        Some("Map")
    );

    assert_eq!(dashboard.actions.len(), 1);
    let action = &dashboard.actions[0];
    assert_eq!(action.action_name, "Region Filter");
    assert_eq!(action.action_type, ActionType::Filter);
    assert_eq!(action.source_sheets, vec!["Map"]);
    assert_eq!(action.target_sheets, vec!["Details"]);
    assert_eq!(action.fields, vec!["Region"]);
    assert!(action.enabled);

    // Sheet references inside the action are not worksheet definitions
    assert!(metadata.worksheets.is_empty());
}

#[test]
fn test_story_points() {
    let xml = workbook(
        r#"<stories>
            <story name='Sales Analysis'>
                <story-points>
                    <story-point caption='Overview'>
                        <worksheet name='Summary'/>
                    </story-point>
                    <story-point caption='Regional Breakdown'>
                        <dashboard name='Regional Dashboard'/>
                        <zones>
                            <zone id='5' type='text'>
                                <text>Key insight: West region grew 30%</text>
                            </zone>
                        </zones>
                    </story-point>
                </story-points>
            </story>
        </stories>"#,
    );

    let metadata = WorkbookParser::new().parse_str(&xml, "stories").unwrap();
    assert_eq!(metadata.stories.len(), 1);
    assert!(metadata.worksheets.is_empty());
    assert!(metadata.dashboards.is_empty());

    let story = &metadata.stories[0];
    assert_eq!(story.story_name, "Sales Analysis");
    assert_eq!(story.points.len(), 2);
    assert_eq!(story.points[0].order, 0);
    assert_eq!(story.points[0].worksheet_name.as_deref(), Some("Summary"));
    assert_eq!(story.points[1].order, 1);
    assert_eq!(
        story.points[1].dashboard_name.as_deref(),
        Some("Regional Dashboard")
    );
    assert!(
        story.points[1]
            .narrative_text
            .as_deref()
            .unwrap()
            .contains("Key insight: West region grew 30%")
    );
}

#[test]
fn test_packaged_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.twbx");
    let xml = workbook("<worksheets><worksheet name='TestSheet'/></worksheets>");
    create_twbx(
        &path,
        &[
            ("Data/Extracts/extract.hyper", "binary"),
            ("test.twb", xml.as_str()),
        ],
    )
    .unwrap();

    let metadata = parse_workbook(&path).unwrap();
    assert_eq!(metadata.workbook_name, "test");
    assert_eq!(metadata.version.as_deref(), Some("18.1"));
    assert_eq!(metadata.worksheets.len(), 1);
    assert_eq!(metadata.worksheets[0].name, "TestSheet");
}

#[test]
fn test_packaged_workbook_prefers_archive_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Sales.twbx");
    let other = workbook("<worksheets><worksheet name='Other'/></worksheets>");
    let main = workbook("<worksheets><worksheet name='Main'/></worksheets>");
    create_twbx(
        &path,
        &[("backup.twb", other.as_str()), ("Sales.twb", main.as_str())],
    )
    .unwrap();

    let metadata = parse_workbook(&path).unwrap();
    assert_eq!(metadata.workbook_name, "Sales");
    assert_eq!(metadata.worksheets[0].name, "Main");
}

#[test]
fn test_packaged_workbook_named_after_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Package.twbx");
    let xml = workbook("<worksheets><worksheet name='Quarter'/></worksheets>");
    create_twbx(&path, &[("Workbooks/Quarterly Report.twb", xml.as_str())]).unwrap();

    let metadata = parse_workbook(&path).unwrap();
    assert_eq!(metadata.workbook_name, "Quarterly Report");
    assert_eq!(metadata.worksheets[0].name, "Quarter");
}

#[test]
fn test_non_utf8_document_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let parser = WorkbookParser::new();
    let bytes: &[u8] = b"<workbook name='\xff\xfe'/>";

    let document = dir.path().join("bad.twb");
    fs::write(&document, bytes).unwrap();
    let err = parser.parse_file(&document).unwrap_err();
    assert!(matches!(err, ParseError::MalformedXml { .. }));

    let archive = dir.path().join("bad.twbx");
    let file = File::create(&archive).unwrap();
    let mut zip = ZipWriter::new(file);
    zip.start_file("bad.twb", SimpleFileOptions::default()).unwrap();
    zip.write_all(bytes).unwrap();
    zip.finish().unwrap();
    let err = parser.parse_file(&archive).unwrap_err();
    assert!(matches!(err, ParseError::MalformedXml { .. }));
}

#[test]
fn test_plain_document_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Superstore.TWB");
    fs::write(
        &path,
        workbook("<worksheets><worksheet name='A'/><worksheet name='B'/></worksheets>"),
    )
    .unwrap();

    let metadata = WorkbookParser::new().parse_file(&path).unwrap();
    assert_eq!(metadata.workbook_name, "Superstore");
    let names: Vec<_> = metadata.worksheets.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[test]
fn test_fatal_errors_are_distinguishable() {
    let dir = tempfile::tempdir().unwrap();
    let parser = WorkbookParser::new();

    let missing = parser.parse_file(dir.path().join("missing.twb")).unwrap_err();
    assert!(matches!(missing, ParseError::NotFound(_)));

    let wrong_type = dir.path().join("workbook.xlsx");
    fs::write(&wrong_type, "not a workbook").unwrap();
    let err = parser.parse_file(&wrong_type).unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedFileType(_)));

    let empty_archive = dir.path().join("empty.twbx");
    create_twbx(&empty_archive, &[("Image/logo.png", "png")]).unwrap();
    let err = parser.parse_file(&empty_archive).unwrap_err();
    assert!(matches!(err, ParseError::NoDocumentInArchive(_)));

    let not_zip = dir.path().join("broken.twbx");
    fs::write(&not_zip, "plain text").unwrap();
    let err = parser.parse_file(&not_zip).unwrap_err();
    assert!(matches!(err, ParseError::Archive(_)));

    let malformed = dir.path().join("malformed.twb");
    fs::write(&malformed, "<workbook><worksheets></workbook>").unwrap();
    let err = parser.parse_file(&malformed).unwrap_err();
    assert!(matches!(err, ParseError::MalformedXml { .. }));
}

#[test]
fn test_missing_identity_is_skipped() {
    let xml = workbook(
        r#"<worksheets>
            <worksheet caption='No name'/>
            <worksheet name='Kept'>
                <filters>
                    <filter class='categorical'/>
                    <filter class='categorical' column='[Segment]'/>
                </filters>
            </worksheet>
        </worksheets>
        <dashboards>
            <dashboard/>
            <dashboard name='Layout'>
                <zones>
                    <zone type='vertical'><zone id='2'/></zone>
                    <zone id='3'/>
                </zones>
            </dashboard>
        </dashboards>
        <stories><story/></stories>"#,
    );

    let metadata = WorkbookParser::new().parse_str(&xml, "partial").unwrap();
    assert_eq!(metadata.worksheets.len(), 1);
    assert_eq!(metadata.worksheets[0].filters.len(), 1);
    assert_eq!(metadata.worksheets[0].filters[0].field_name, "Segment");

    assert_eq!(metadata.dashboards.len(), 1);
    let containers = &metadata.dashboards[0].layout_containers;
    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].container_id, "3");

    assert!(metadata.stories.is_empty());
}

#[test]
fn test_full_worksheet() {
    let xml = workbook(
        r#"<datasources>
            <datasource name='federated.1' caption='Superstore' inline='true'>
                <connection class='sqlserver' server='db.local' dbname='sales' schema='dbo'/>
                <column name='[Days to Ship]' datatype='integer'>
                    <calculation class='tableau' formula='DATEDIFF("day", [Order Date], [Ship Date])'/>
                </column>
            </datasource>
        </datasources>
        <worksheets>
            <worksheet name='Sales by Region'>
                <table>
                    <panes>
                        <pane id='0'>
                            <color><field>[Profit]</field></color>
                        </pane>
                    </panes>
                    <rows>[federated.1].[none:Region:nk]</rows>
                    <cols><field name='[Sales]'/></cols>
                </table>
                <filters>
                    <filter class='quantitative' column='[Sales]'><min>0</min><max>100</max></filter>
                </filters>
            </worksheet>
        </worksheets>"#,
    );

    let metadata = WorkbookParser::new().parse_str(&xml, "full").unwrap();
    let worksheet = metadata.get_worksheet("Sales by Region").unwrap();

    // The rows shelf holds no <field> elements and the filter shelf only
    // carries column attributes, so neither yields a zone
    let zone_ids: Vec<_> = worksheet.zones.iter().map(|z| z.zone_id.as_str()).collect();
    assert_eq!(zone_ids, vec!["0_color", "shelf_columns"]);
    assert_eq!(worksheet.filters[0].filter_id, "Sales_by_Region_Sales");
    assert_eq!(
        worksheet.filters[0].condition.as_deref(),
        Some("BETWEEN 0 AND 100")
    );

    let source = &metadata.data_sources[0];
    assert!(source.inline);
    let connection = source.connection.as_ref().unwrap();
    assert_eq!(connection.server.as_deref(), Some("db.local"));
    assert_eq!(connection.schema.as_deref(), Some("dbo"));
    assert_eq!(source.calculated_fields[0].name, "Days to Ship");

    let all: Vec<_> = metadata.all_calculated_fields().map(|f| f.name.as_str()).collect();
    assert_eq!(all, vec!["Days to Ship"]);
}
