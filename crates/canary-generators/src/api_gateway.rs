//! API Gateway invocation URIs

use canary_template::pointer;
use serde_json::{json, Value};

const FUNCTIONS_PATH: &str = ":lambda:path/2015-03-31/functions/";
const INVOCATIONS: &str = "/invocations";

/// REST API (v1) integration URI invoking `alias`
#[must_use]
pub fn invocation_uri(alias: &str) -> Value {
    json!({
        "Fn::Join": ["", [
            "arn:aws:apigateway:",
            pointer::reference("AWS::Region"),
            FUNCTIONS_PATH,
            pointer::reference(alias),
            INVOCATIONS
        ]]
    })
}

/// HTTP/WebSocket API (v2) integration or authorizer URI invoking `alias`
#[must_use]
pub fn v2_invocation_uri(alias: &str) -> Value {
    json!({
        "Fn::Join": ["", [
            "arn:",
            pointer::reference("AWS::Partition"),
            ":apigateway:",
            pointer::reference("AWS::Region"),
            FUNCTIONS_PATH,
            pointer::reference(alias),
            INVOCATIONS
        ]]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v1_uri_targets_alias() {
        let uri = invocation_uri("HelloAliasLive");
        assert_eq!(uri["Fn::Join"][1][3], json!({"Ref": "HelloAliasLive"}));
        assert_eq!(uri["Fn::Join"][1][0], json!("arn:aws:apigateway:"));
    }

    #[test]
    fn v2_uri_is_partition_aware() {
        let uri = v2_invocation_uri("HelloAliasLive");
        assert_eq!(uri["Fn::Join"][1][1], json!({"Ref": "AWS::Partition"}));
        assert_eq!(uri["Fn::Join"][1][5], json!({"Ref": "HelloAliasLive"}));
    }
}
