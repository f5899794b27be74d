//! Closed set of resource kinds that can point at a function

use std::fmt::{self, Display, Formatter};

/// Resource kind that may reference a Lambda function
///
/// Every variant must be handled by both [`crate::locator::site`] and the
/// rewriter's replacement table; both are exhaustive matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// `AWS::Lambda::Permission`
    LambdaPermission,
    /// `AWS::Lambda::EventSourceMapping`
    EventSourceMapping,
    /// `AWS::ApiGateway::Method`
    ApiGatewayMethod,
    /// `AWS::ApiGatewayV2::Integration`
    ApiGatewayV2Integration,
    /// `AWS::ApiGatewayV2::Authorizer`
    ApiGatewayV2Authorizer,
    /// `AWS::SNS::Topic`
    SnsTopic,
    /// `AWS::SNS::Subscription`
    SnsSubscription,
    /// `AWS::S3::Bucket`
    S3Bucket,
    /// `AWS::Events::Rule`
    EventsRule,
    /// `AWS::Logs::SubscriptionFilter`
    LogsSubscriptionFilter,
    /// `AWS::IoT::TopicRule`
    IotTopicRule,
    /// `AWS::AppSync::DataSource`
    AppSyncDataSource,
}

impl ResourceKind {
    /// Kinds that deliver events to a function, in lookup order
    pub const EVENT_SOURCES: [Self; 11] = [
        Self::ApiGatewayMethod,
        Self::ApiGatewayV2Integration,
        Self::ApiGatewayV2Authorizer,
        Self::EventSourceMapping,
        Self::SnsTopic,
        Self::S3Bucket,
        Self::EventsRule,
        Self::LogsSubscriptionFilter,
        Self::SnsSubscription,
        Self::IotTopicRule,
        Self::AppSyncDataSource,
    ];

    /// CloudFormation type tag
    #[must_use]
    pub const fn type_tag(self) -> &'static str {
        match self {
            Self::LambdaPermission => "AWS::Lambda::Permission",
            Self::EventSourceMapping => "AWS::Lambda::EventSourceMapping",
            Self::ApiGatewayMethod => "AWS::ApiGateway::Method",
            Self::ApiGatewayV2Integration => "AWS::ApiGatewayV2::Integration",
            Self::ApiGatewayV2Authorizer => "AWS::ApiGatewayV2::Authorizer",
            Self::SnsTopic => "AWS::SNS::Topic",
            Self::SnsSubscription => "AWS::SNS::Subscription",
            Self::S3Bucket => "AWS::S3::Bucket",
            Self::EventsRule => "AWS::Events::Rule",
            Self::LogsSubscriptionFilter => "AWS::Logs::SubscriptionFilter",
            Self::IotTopicRule => "AWS::IoT::TopicRule",
            Self::AppSyncDataSource => "AWS::AppSync::DataSource",
        }
    }

    /// Kind for a CloudFormation type tag
    #[must_use]
    pub fn from_type_tag(type_tag: &str) -> Option<Self> {
        std::iter::once(Self::LambdaPermission)
            .chain(Self::EVENT_SOURCES)
            .find(|kind| kind.type_tag() == type_tag)
    }

    /// Whether this kind delivers events (everything except permissions)
    #[inline]
    #[must_use]
    pub fn is_event_source(self) -> bool {
        !matches!(self, Self::LambdaPermission)
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_tag())
    }
}
