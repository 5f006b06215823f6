// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Mapping from log group naming conventions to service namespaces.

/// Known log group prefixes. The first matching entry wins.
pub const LOG_GROUP_NAMESPACES: &[(&str, &str)] = &[
    ("/aws/apigateway/", "aws/apigateway"),
    ("/aws/rds/cluster/", "aws/rds"),
    ("/aws/cloudhsm/", "aws/cloudhsm"),
    ("aws-cloudtrail-logs-", "aws/cloudtrail"),
    ("/aws/codebuild/", "aws/codebuild"),
    ("/aws/connect/", "aws/connect"),
    ("/aws/elasticbeanstalk/", "aws/elasticbeanstalk"),
    ("/aws/ecs/", "aws/ecs"),
    ("/aws/eks/", "aws/eks"),
    ("/aws-glue/", "glue"),
    ("AWSIotLogsV2", "aws/iot"),
    ("/aws/lambda/", "aws/lambda"),
    ("/aws/macie/", "aws/macie"),
    ("/aws/amazonmq/broker/", "aws/amazonmq"),
];

/// Ordered prefix to namespace table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamespaceTable<'a> {
    entries: &'a [(&'a str, &'a str)],
}

impl Default for NamespaceTable<'static> {
    fn default() -> Self {
        NamespaceTable::new(LOG_GROUP_NAMESPACES)
    }
}

impl<'a> NamespaceTable<'a> {
    #[must_use]
    pub const fn new(entries: &'a [(&'a str, &'a str)]) -> Self {
        NamespaceTable { entries }
    }

    /// Namespace of the first entry whose prefix starts `log_group`.
    #[must_use]
    pub fn resolve(&self, log_group: &str) -> Option<&'a str> {
        self.entries
            .iter()
            .find(|(prefix, _)| log_group.starts_with(prefix))
            .map(|(_, namespace)| *namespace)
    }

    #[must_use]
    pub fn entries(&self) -> &'a [(&'a str, &'a str)] {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duplicate::duplicate_item;

    #[duplicate_item(
        test_name                   log_group                                   expected;
        [test_resolve_apigateway]   ["/aws/apigateway/my-api"]                  [Some("aws/apigateway")];
        [test_resolve_rds]          ["/aws/rds/cluster/db-1/postgresql"]        [Some("aws/rds")];
        [test_resolve_cloudtrail]   ["aws-cloudtrail-logs-123456789012-abcd"]   [Some("aws/cloudtrail")];
        [test_resolve_glue]         ["/aws-glue/jobs/output"]                   [Some("glue")];
        [test_resolve_iot]          ["AWSIotLogsV2"]                            [Some("aws/iot")];
        [test_resolve_lambda]       ["/aws/lambda/my-fn"]                       [Some("aws/lambda")];
        [test_resolve_amazonmq]     ["/aws/amazonmq/broker/b-1/general"]        [Some("aws/amazonmq")];
        [test_resolve_unknown]      ["/custom/app"]                             [None];
        [test_resolve_empty]        [""]                                        [None];
        [test_resolve_not_prefix]   ["/prod/aws/lambda/my-fn"]                  [None];
        [test_resolve_rds_instance] ["/aws/rds/instance/db-1/error"]            [None];
    )]
    #[test]
    fn test_name() {
        assert_eq!(NamespaceTable::default().resolve(log_group), expected);
    }

    #[test]
    fn test_earlier_prefix_wins() {
        let table = NamespaceTable::new(&[("/aws/", "aws"), ("/aws/lambda/", "aws/lambda")]);
        assert_eq!(table.resolve("/aws/lambda/my-fn"), Some("aws"));

        let table = NamespaceTable::new(&[("/aws/lambda/", "aws/lambda"), ("/aws/", "aws")]);
        assert_eq!(table.resolve("/aws/lambda/my-fn"), Some("aws/lambda"));
        assert_eq!(table.resolve("/aws/ecs/cluster"), Some("aws"));
    }

    #[test]
    fn test_default_table_is_ordered_as_declared() {
        let table = NamespaceTable::default();
        assert_eq!(table.entries().len(), LOG_GROUP_NAMESPACES.len());
        assert_eq!(table.entries()[0], ("/aws/apigateway/", "aws/apigateway"));
    }
}
