use pgbuild::prelude::*;
use pretty_assertions::assert_eq;

const MYTABLE: &str = r#"
table: myschema.mytable
description: table of tables
columns:
    - col1:
        type: int
        default: 0
        not_null: true
        description: first column
    - col2: text
    - name: col3
      type: text
      default: ""
primary_key: [col1]
indexes:
    - idx1: [col1, col2]
    - idx2: (lower(col1 || col2))
    - idx3:
        fields: col1
        unique: true
        predicate: col2 = 'blabla'
    - name: idx4
      fields: [col2, col3]
      access_method: gin
check:
    - col1_check: col1 > 0 and col1 < 100
"#;

#[test]
fn test_create_clause_literal_scenario() {
    let table = Table::from_yaml_str(MYTABLE).unwrap();

    assert_eq!(
        table.create_clause(),
        "CREATE TABLE IF NOT EXISTS myschema.mytable (
    col1 int DEFAULT 0 NOT NULL,
    col2 text,
    col3 text DEFAULT ''
);
ALTER TABLE myschema.mytable ADD PRIMARY KEY (col1);
COMMENT ON TABLE myschema.mytable IS 'table of tables';
COMMENT ON COLUMN myschema.mytable.col1 IS 'first column';
DROP INDEX CONCURRENTLY IF EXISTS myschema.idx1;
CREATE INDEX idx1 ON myschema.mytable USING btree
    (col1, col2);
DROP INDEX CONCURRENTLY IF EXISTS myschema.idx2;
CREATE INDEX idx2 ON myschema.mytable USING btree
    ((lower(col1 || col2)));
DROP INDEX CONCURRENTLY IF EXISTS myschema.idx3;
CREATE UNIQUE INDEX idx3 ON myschema.mytable USING btree
    (col1)
    WHERE col2 = 'blabla';
DROP INDEX CONCURRENTLY IF EXISTS myschema.idx4;
CREATE INDEX idx4 ON myschema.mytable USING gin
    (col2, col3);
ALTER TABLE myschema.mytable ADD CONSTRAINT col1_check CHECK (col1 > 0 and col1 < 100);
"
    );
}

#[test]
fn test_alter_literal_scenario() {
    let a = Table::from_yaml_str(
        "
table: my.table
columns:
    - col1: text
    - col2: int
    - col3: text
primary_key: [col2]
indexes:
    - idx1: col1
",
    )
    .unwrap();
    let b = Table::from_yaml_str(
        "
table: my.table
columns:
    - col1: text
    - col2: text
    - col4:
        type: date
        description: some date
primary_key: [col1, col2]
indexes:
    - idx2: col2
",
    )
    .unwrap();

    assert_eq!(
        a.alter_to(&b),
        "ALTER TABLE my.table ALTER COLUMN col2 TYPE text;
ALTER TABLE my.table DROP COLUMN IF EXISTS col3;
ALTER TABLE my.table ADD COLUMN col4 date;
COMMENT ON COLUMN my.table.col4 IS 'some date';
DROP INDEX CONCURRENTLY IF EXISTS my.idx1;
CREATE INDEX idx2 ON my.table USING btree
    (col2);
ALTER TABLE my.table DROP table_pkey;
ALTER TABLE my.table ADD PRIMARY KEY (col1, col2);
"
    );
}

#[test]
fn test_column_order_does_not_matter() {
    let a = Table::from_yaml_str("table: s.t\ncolumns: [{a: int}, {b: text}, {c: date}]").unwrap();
    let b = Table::from_yaml_str("table: s.t\ncolumns: [{c: date}, {a: int}, {b: text}]").unwrap();
    assert_eq!(a.columns, b.columns);
    assert_eq!(a.alter_to(&b), "");
}

#[test]
fn test_create_then_alter_to_self_is_empty() {
    let table = Table::from_yaml_str(MYTABLE).unwrap();
    assert_eq!(table.alter_to(&table), "");
    assert_eq!(
        table.alter_to_with(&table, &AlterOptions { checks: true }),
        ""
    );
}

#[test]
fn test_add_and_drop_direction() {
    let a = Table::from_yaml_str("table: s.t\ncolumns: [{id: int}]").unwrap();
    let b = Table::from_yaml_str("table: s.t\ncolumns: [{id: int}, {c: text}]").unwrap();
    assert!(a.alter_to(&b).contains("ADD COLUMN c text"));
    assert!(b.alter_to(&a).contains("DROP COLUMN IF EXISTS c"));
}

#[test]
fn test_default_quoting() {
    let text = Column::new("c", "text").with_default("foo");
    let int = Column::new("n", "int").with_default("0");
    assert_eq!(text.create_clause(), "    c text DEFAULT 'foo'");
    assert_eq!(int.create_clause(), "    n int DEFAULT 0");
}

#[test]
fn test_primary_key_reorder_is_recreated() {
    let a = Table::from_yaml_str("table: t\ncolumns: [{a: int}, {b: int}]\nprimary_key: [a, b]")
        .unwrap();
    let b = Table::from_yaml_str("table: t\ncolumns: [{a: int}, {b: int}]\nprimary_key: [b, a]")
        .unwrap();
    assert_ne!(a.primary_key, b.primary_key);
    assert_eq!(
        a.alter_to(&b),
        "ALTER TABLE t DROP t_pkey;\nALTER TABLE t ADD PRIMARY KEY (b, a);\n"
    );
}

#[test]
fn test_json_snapshot() {
    let table = Table::from_yaml_str("table: s.t\ncolumns: [{id: int}]\nprimary_key: [id]").unwrap();
    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(json["name"], "s.t");
    assert_eq!(json["columns"][0]["type"], "int");
    assert_eq!(json["primary_key"][0]["name"], "id");
}

const REFERENCE_TABLE: &str = r#"
table: myschema.mytable
description: table of tables
columns:
    - col1:
        type: int
        default: 0
        not_null: true
        description: test
    - col2: text
    - name: col3
      type: text
      default: ""
primary_key: [col1]
indexes:
    - idx1: [col1, col2]
    - idx2: (lower(col1 || col2))
    - idx3:
        fields: [col1, col2]
        method: btree
        predicate: blabla
        unique: true
    - name: idx4
      fields: [col1, col2]
      method: gin
check:
    - col1_check: col1 > 0 and col1 < 100
"#;

#[test]
fn test_create_clause_reference_fixture() {
    let table = Table::from_yaml_str(REFERENCE_TABLE).unwrap();

    assert_eq!(
        table.create_clause(),
        "CREATE TABLE IF NOT EXISTS myschema.mytable (
    col1 int DEFAULT 0 NOT NULL,
    col2 text,
    col3 text DEFAULT ''
);
ALTER TABLE myschema.mytable ADD PRIMARY KEY (col1);
COMMENT ON TABLE myschema.mytable IS 'table of tables';
COMMENT ON COLUMN myschema.mytable.col1 IS 'test';
DROP INDEX CONCURRENTLY IF EXISTS myschema.idx1;
CREATE INDEX idx1 ON myschema.mytable USING btree
    (col1, col2);
DROP INDEX CONCURRENTLY IF EXISTS myschema.idx2;
CREATE INDEX idx2 ON myschema.mytable USING btree
    ((lower(col1 || col2)));
DROP INDEX CONCURRENTLY IF EXISTS myschema.idx3;
CREATE UNIQUE INDEX idx3 ON myschema.mytable USING btree
    (col1, col2)
    WHERE blabla;
DROP INDEX CONCURRENTLY IF EXISTS myschema.idx4;
CREATE INDEX idx4 ON myschema.mytable USING gin
    (col1, col2);
ALTER TABLE myschema.mytable ADD CONSTRAINT col1_check CHECK (col1 > 0 and col1 < 100);
"
    );
}

#[test]
fn test_reference_fixture_column_sets() {
    let table = Table::from_yaml_str(REFERENCE_TABLE).unwrap();
    let reordered = Table::from_yaml_str(
        r#"
table: myschema.mytable
columns:
    - col1:
        type: int
        default: 0
        not_null: true
        description: test
    - name: col3
      type: text
      default: ""
    - col2: text
"#,
    )
    .unwrap();
    assert_eq!(table.columns, reordered.columns);

    let mut extended = reordered.clone();
    extended.columns.push(Column::new("aaaa", "text"));
    assert_ne!(table.columns, extended.columns);
}

#[test]
fn test_added_columns_skip_falsy_defaults() {
    let a = Table::from_yaml_str("table: s.t\ncolumns: [{id: int}]").unwrap();
    let b = Table::from_yaml_str(
        "table: s.t
columns:
    - id: int
    - n: {type: int, default: 0}
    - f: {type: boolean, default: false}
    - r: {type: real, default: 0.0}
    - m: {type: int, default: 5}
",
    )
    .unwrap();

    assert_eq!(
        a.alter_to(&b),
        "ALTER TABLE s.t ADD COLUMN n int;
ALTER TABLE s.t ADD COLUMN f boolean;
ALTER TABLE s.t ADD COLUMN r real;
ALTER TABLE s.t ADD COLUMN m int;
ALTER TABLE s.t ALTER COLUMN m SET DEFAULT 5;
"
    );
    assert!(b.create_clause().contains("    n int DEFAULT 0,\n    f boolean DEFAULT false,"));
}
