use serde_json::Value;
use twbrs::{TableauMetadata, WorkbookParser};

const WORKBOOK: &str = r#"<?xml version='1.0' encoding='utf-8' ?>
<workbook version='2023.1'>
  <datasources>
    <datasource name='federated.1' caption='Superstore'>
      <connection class='excel-direct' dbname='Superstore.xls'/>
    </datasource>
  </datasources>
  <worksheets>
    <worksheet name='Sales Map'>
      <column name='[Region Share]' datatype='real' role='measure' type='quantitative'>
        <calculation class='tableau' formula='{EXCLUDE [State] : SUM([Sales])}'/>
      </column>
      <filters>
        <filter class='relative-date' column='[Order Date]' period='3 month'/>
      </filters>
    </worksheet>
  </worksheets>
  <dashboards>
    <dashboard name='Overview'>
      <zones>
        <zone id='1' type='vertical' x='0' y='0' w='1200' h='800'>
          <zone id='2' type='layout-basic' name='Sales Map' x='0' y='0' w='1200' h='600'/>
          <zone id='3' type='filter' x='0' y='600' w='1200' h='200'>
            <filter column='[Category]'>
              <groupfilter function='except'><member value='Furniture'/></groupfilter>
            </filter>
          </zone>
        </zone>
      </zones>
      <actions>
        <sheet-navigation-action name='Go Detail' enabled='false'>
          <target><worksheet name='Sales Map'/></target>
        </sheet-navigation-action>
      </actions>
    </dashboard>
  </dashboards>
  <parameters>
    <parameter name='Metric' datatype='string' value='Sales'>
      <alias key='Sales' value='Revenue'/>
    </parameter>
  </parameters>
</workbook>"#;

fn parse() -> TableauMetadata {
    WorkbookParser::new().parse_str(WORKBOOK, "Superstore").unwrap()
}

#[test]
fn test_top_level_shape() {
    let value = parse().to_value().unwrap();

    assert_eq!(value["@context"], "https://schema.org/");
    assert_eq!(value["@type"], "Dataset");
    assert_eq!(value["name"], "Superstore");
    assert_eq!(value["version"], "2023.1");
    assert!(value["dateExtracted"].is_string());
    assert_eq!(value["worksheets"].as_array().unwrap().len(), 1);
    assert_eq!(value["dashboards"].as_array().unwrap().len(), 1);
    assert_eq!(value["stories"], Value::Array(Vec::new()));
    assert_eq!(value["dataSources"][0]["caption"], "Superstore");
    assert_eq!(value["dataSources"][0]["connection"]["class"], "excel-direct");
    assert_eq!(value["parameters"][0]["allowed_values"][0]["value"], "Revenue");
}

#[test]
fn test_enum_labels_in_output() {
    let value = parse().to_value().unwrap();

    let field = &value["worksheets"][0]["calculated_fields"][0];
    assert_eq!(field["lod_type"], "EXCLUDE");
    assert_eq!(field["lod_scope"][0], "State");
    assert_eq!(field["type"], "quantitative");

    let filter = &value["worksheets"][0]["filters"][0];
    assert_eq!(filter["filter_type"], "relative_date");
    assert_eq!(filter["relative_date_period"], "3 month");

    let action = &value["dashboards"][0]["actions"][0];
    assert_eq!(action["action_type"], "go_to_sheet");
    assert_eq!(action["enabled"], false);
}

#[test]
fn test_nested_layout_and_unset_fields() {
    let value = parse().to_value().unwrap();
    let dashboard = &value["dashboards"][0];

    let root = &dashboard["layout_containers"][0];
    assert_eq!(root["container_id"], "1");
    assert_eq!(root["position"]["width"], 1200);
    assert!(root["title"].is_null());
    assert_eq!(root["children"][0]["worksheet_name"], "Sales Map");
    assert_eq!(root["children"][1]["container_type"], "filter");

    let filter = &dashboard["filters"][0];
    assert_eq!(filter["dashboard"], "Overview");
    assert!(filter["worksheet"].is_null());
    assert_eq!(filter["exclude_values"][0], "Furniture");
    assert!(filter["filter_values"].is_null());
}

#[test]
fn test_json_round_trip() {
    let metadata = parse();

    let json = metadata.to_json_pretty().unwrap();
    let restored = TableauMetadata::from_json(&json).unwrap();
    assert_eq!(restored, metadata);

    let compact: Value = serde_json::from_str(&metadata.to_json().unwrap()).unwrap();
    assert_eq!(compact, metadata.to_value().unwrap());
}
