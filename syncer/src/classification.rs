use model::db_schema::config::DatabaseConfig;
use model::db_schema::metadata::DatabaseSchemaMetadata;

/// Copy every object comment into its user comment verbatim. Used when
/// classification comes from config: comments carry no identifiers, so
/// nothing is parsed out of them.
pub fn set_user_comment_from_comment(metadata: &mut DatabaseSchemaMetadata) {
    for schema in &mut metadata.schemas {
        for table in &mut schema.tables {
            table.user_comment = table.comment.clone();
            for column in &mut table.columns {
                column.user_comment = column.comment.clone();
            }
        }
    }
}

/// Parse classification identifiers out of table and column comments,
/// writing user comments onto the metadata and identifiers onto the parallel
/// config tree. Config nodes that end up empty are pruned bottom-up.
///
/// Parsing always reads the original `comment` field, so re-running the
/// annotator on already annotated metadata is a no-op.
pub fn set_classification_and_user_comment_from_comment(
    metadata: &mut DatabaseSchemaMetadata,
    config: &mut DatabaseConfig,
) {
    for schema in &mut metadata.schemas {
        let schema_config = config.schema_entry(&schema.name);
        for table in &mut schema.tables {
            let table_config = schema_config.table_entry(&table.name);
            let (classification, user_comment) = split_classification_comment(&table.comment);
            table.user_comment = user_comment;
            table_config.classification_id = classification;

            for column in &mut table.columns {
                let (classification, user_comment) =
                    split_classification_comment(&column.comment);
                column.user_comment = user_comment;

                let column_config = table_config.column_entry(&column.name);
                column_config.classification_id = classification;
                if column_config.is_empty() {
                    table_config.remove_column(&column.name);
                }
            }

            if table_config.is_empty() {
                schema_config.remove_table(&table.name);
            }
        }
        if config
            .schemas
            .get(&schema.name)
            .is_some_and(|schema_config| schema_config.is_empty())
        {
            config.remove_schema(&schema.name);
        }
    }
}

/// Split an object comment into `(classification, user_comment)`. The
/// classification is a leading run of dash-separated numeric segments,
/// separated from the free-form remainder by one more dash:
/// `"2-1-contains PII"` → `("2-1", "contains PII")`. A comment without such
/// a prefix carries no classification and passes through unchanged.
pub fn split_classification_comment(comment: &str) -> (String, String) {
    let prefix = classification_prefix_len(comment);
    if prefix == 0 {
        return (String::new(), comment.to_owned());
    }
    let rest = &comment[prefix..];
    if rest.is_empty() {
        return (comment.to_owned(), String::new());
    }
    match rest.strip_prefix('-') {
        Some(user_comment) => (comment[..prefix].to_owned(), user_comment.to_owned()),
        // The numeric prefix runs into non-numeric text without a delimiter,
        // so it is part of the comment, not a classification.
        None => (String::new(), comment.to_owned()),
    }
}

/// Length of the longest prefix matching `\d+(-\d+)*`.
fn classification_prefix_len(comment: &str) -> usize {
    let bytes = comment.as_bytes();
    let mut end = 0;
    let mut i = 0;
    loop {
        let segment_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == segment_start {
            break;
        }
        end = i;
        if i < bytes.len() && bytes[i] == b'-' {
            i += 1;
        } else {
            break;
        }
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::db_schema::metadata::{ColumnMetadata, SchemaMetadata, TableMetadata};
    use proptest::prelude::*;

    fn annotated_fixture() -> DatabaseSchemaMetadata {
        DatabaseSchemaMetadata {
            name: "orders".to_owned(),
            schemas: vec![SchemaMetadata {
                name: "public".to_owned(),
                tables: vec![
                    TableMetadata {
                        comment: "2-1-order data".to_owned(),
                        columns: vec![
                            ColumnMetadata {
                                comment: "2-1-1-customer email".to_owned(),
                                ..ColumnMetadata::named("email")
                            },
                            ColumnMetadata {
                                comment: "free-form note".to_owned(),
                                ..ColumnMetadata::named("note")
                            },
                        ],
                        ..TableMetadata::named("orders")
                    },
                    TableMetadata::named("plain"),
                ],
            }],
            ..DatabaseSchemaMetadata::default()
        }
    }

    #[test]
    fn splitter_edge_cases() {
        assert_eq!(
            split_classification_comment("2-1-contains PII"),
            ("2-1".to_owned(), "contains PII".to_owned())
        );
        assert_eq!(
            split_classification_comment("7-internal"),
            ("7".to_owned(), "internal".to_owned())
        );
        assert_eq!(
            split_classification_comment("3-2"),
            ("3-2".to_owned(), String::new())
        );
        assert_eq!(
            split_classification_comment("just a comment"),
            (String::new(), "just a comment".to_owned())
        );
        assert_eq!(
            split_classification_comment(""),
            (String::new(), String::new())
        );
        assert_eq!(
            split_classification_comment("1-"),
            ("1".to_owned(), String::new())
        );
        // An undelimited numeric prefix is not a classification.
        assert_eq!(
            split_classification_comment("1password"),
            (String::new(), "1password".to_owned())
        );
    }

    #[test]
    fn from_config_mode_copies_comments_verbatim() {
        let mut metadata = annotated_fixture();
        set_user_comment_from_comment(&mut metadata);

        let table = &metadata.schemas[0].tables[0];
        assert_eq!(table.user_comment, "2-1-order data");
        assert_eq!(table.columns[0].user_comment, "2-1-1-customer email");
        assert_eq!(table.columns[1].user_comment, "free-form note");
    }

    #[test]
    fn from_comment_mode_annotates_and_prunes() {
        let mut metadata = annotated_fixture();
        let mut config = DatabaseConfig::default();
        set_classification_and_user_comment_from_comment(&mut metadata, &mut config);

        let table = &metadata.schemas[0].tables[0];
        assert_eq!(table.user_comment, "order data");
        assert_eq!(table.columns[0].user_comment, "customer email");
        assert_eq!(table.columns[1].user_comment, "free-form note");

        let schema_config = &config.schemas["public"];
        let table_config = &schema_config.tables["orders"];
        assert_eq!(table_config.classification_id, "2-1");
        assert_eq!(table_config.columns["email"].classification_id, "2-1-1");
        // The unclassified column and the comment-less table are pruned.
        assert!(!table_config.columns.contains_key("note"));
        assert!(!schema_config.tables.contains_key("plain"));
    }

    #[test]
    fn annotator_is_idempotent() {
        let mut metadata = annotated_fixture();
        let mut config = DatabaseConfig::default();
        set_classification_and_user_comment_from_comment(&mut metadata, &mut config);

        let (metadata_once, config_once) = (metadata.clone(), config.clone());
        set_classification_and_user_comment_from_comment(&mut metadata, &mut config);
        assert_eq!(metadata, metadata_once);
        assert_eq!(config, config_once);
    }

    #[test]
    fn comment_free_tree_yields_empty_config() {
        let mut metadata = DatabaseSchemaMetadata {
            schemas: vec![SchemaMetadata {
                name: "public".to_owned(),
                tables: vec![TableMetadata {
                    columns: vec![ColumnMetadata::named("id")],
                    ..TableMetadata::named("bare")
                }],
            }],
            ..DatabaseSchemaMetadata::default()
        };
        let mut config = DatabaseConfig::default();
        set_classification_and_user_comment_from_comment(&mut metadata, &mut config);
        assert!(config.is_empty());
    }

    proptest! {
        /// Splitting never loses the tail: the parts always rebuild the
        /// original comment (modulo the single separating dash).
        #[test]
        fn splitter_parts_rebuild_comment(comment in ".{0,40}") {
            let (classification, user_comment) = split_classification_comment(&comment);
            let rebuilt = if classification.is_empty() {
                user_comment.clone()
            } else if user_comment.is_empty() && comment == classification {
                classification.clone()
            } else {
                format!("{classification}-{user_comment}")
            };
            prop_assert_eq!(rebuilt, comment);
        }

        #[test]
        fn splitter_is_idempotent_on_user_comment(comment in ".{0,40}") {
            let (_, user_comment) = split_classification_comment(&comment);
            if split_classification_comment(&user_comment).0.is_empty() {
                let (_, again) = split_classification_comment(&user_comment);
                prop_assert_eq!(again, user_comment);
            }
        }
    }
}
