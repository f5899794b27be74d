//! Canary deployment orchestrator
//!
//! One synchronous pass over a compiled template:
//! 1. Gate on opted-in functions and the enabled stages
//! 2. Per function: deployment group, alias, rewritten permissions and events
//! 3. Shared resources: application, CodeDeploy role, execution role
//! 4. Compose everything into a single additive [`TemplatePatch`]
//!
//! Any error aborts the pass before the template is touched.

use canary_generators::code_deploy;
use canary_generators::iam::{self, CODE_DEPLOY_ROLE_LOGICAL_ID};
use canary_generators::lambda::{self, AliasParams, TrafficShifting};
use canary_generators::{locator, rewriter, DeploymentGroupParams, GenerateError};
use canary_template::{Resource, Template, TemplatePatch};

use crate::config::ServiceConfig;
use crate::error::CanaryError;
use crate::naming::{Naming, ServerlessNaming};
use crate::settings::ResolvedSettings;

/// Adds traffic-shifted release resources to a compiled template
#[derive(Debug, Clone)]
pub struct CanaryDeployments<N = ServerlessNaming> {
    config: ServiceConfig,
    naming: N,
}

impl CanaryDeployments {
    /// Orchestrator using Serverless Framework naming for `config`
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        let naming = ServerlessNaming::for_service(&config);
        Self { config, naming }
    }
}

impl<N: Naming> CanaryDeployments<N> {
    /// Orchestrator with custom naming
    #[inline]
    #[must_use]
    pub fn with_naming(config: ServiceConfig, naming: N) -> Self {
        Self { config, naming }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Logical id of the per-stack CodeDeploy application
    #[must_use]
    pub fn code_deploy_app_name(&self) -> String {
        let stack_name = self.naming.stack_name();
        format!(
            "{}DeploymentApplication",
            self.naming.normalize_name_to_alpha_numeric_only(&stack_name)
        )
    }

    /// Logical id of a function's deployment group
    #[must_use]
    pub fn deployment_group_id(function_logical_id: &str) -> String {
        format!("{function_logical_id}DeploymentGroup")
    }

    /// Physical name of a deployment group
    #[must_use]
    pub fn deployment_group_name(&self, group_logical_id: &str) -> String {
        code_deploy::deployment_group_name(&self.naming.stack_name(), group_logical_id)
    }

    /// Declared names of the functions that opted in
    #[must_use]
    pub fn gated_functions(&self) -> Vec<&str> {
        self.config.functions_with_deployment_settings().collect()
    }

    /// Whether the current stage is in the allow-list (or there is none)
    #[must_use]
    pub fn current_stage_enabled(&self) -> bool {
        let stages = self.config.global_settings().enabled_stages();
        stages.is_empty() || stages.iter().any(|stage| stage == self.config.stage())
    }

    /// Whether a pass would change anything
    #[must_use]
    pub fn should_deploy_gradually(&self) -> bool {
        self.config.functions_with_deployment_settings().next().is_some()
            && self.current_stage_enabled()
    }

    /// Build the patch for `template` without modifying it
    ///
    /// Empty when the pass is gated off.
    ///
    /// # Errors
    /// Fails on settings without `alias` or `type`, on a gated function with
    /// no version resource, and on rewrites that cannot be applied.
    pub fn build_patch(&self, template: &Template) -> Result<TemplatePatch, CanaryError> {
        if !self.should_deploy_gradually() {
            tracing::debug!(
                "No function opted in for stage {}; leaving template unchanged",
                self.config.stage()
            );
            return Ok(TemplatePatch::new());
        }

        let application = self.code_deploy_app_name();
        let functions = self.gated_functions();
        tracing::info!(
            "Adding traffic-shifted releases for {} function(s) under {}",
            functions.len(),
            application
        );

        let mut functions_patch = TemplatePatch::new();
        for function in &functions {
            self.build_function_resources(template, function, &application, &mut functions_patch)?;
        }

        let mut patch = TemplatePatch::new();
        patch.add(application.as_str(), code_deploy::application());
        if let Some(role) = self.build_code_deploy_role(Self::has_trigger_configurations(&functions_patch)) {
            patch.add(CODE_DEPLOY_ROLE_LOGICAL_ID, role);
        }
        if let Some((logical_id, role)) = self.build_execution_role(template, &application) {
            patch.replace(logical_id, role);
        }
        patch.extend(functions_patch);

        tracing::info!(
            "Patch adds {} and replaces {} resource(s)",
            patch.added().count(),
            patch.replaced().count()
        );
        Ok(patch)
    }

    /// Copy of `template` with the patch applied
    ///
    /// # Errors
    /// See [`CanaryDeployments::build_patch`].
    pub fn transform(&self, template: &Template) -> Result<Template, CanaryError> {
        Ok(template.merged(self.build_patch(template)?))
    }

    /// Apply the pass to `template` in place
    ///
    /// On error `template` is left exactly as it was.
    ///
    /// # Errors
    /// See [`CanaryDeployments::build_patch`].
    pub fn add_canary_deployment_resources(&self, template: &mut Template) -> Result<(), CanaryError> {
        let patch = self.build_patch(template)?;
        template.apply(patch);
        Ok(())
    }

    fn resolved_settings(&self, function: &str) -> Result<ResolvedSettings, CanaryError> {
        let settings = self
            .config
            .deployment_settings_for(function)
            .unwrap_or_default();
        Ok(settings.resolve(function)?)
    }

    fn build_function_resources(
        &self,
        template: &Template,
        function_name: &str,
        application: &str,
        patch: &mut TemplatePatch,
    ) -> Result<(), CanaryError> {
        let settings = self.resolved_settings(function_name)?;
        let function = self.naming.lambda_logical_id(function_name);

        let group_id = Self::deployment_group_id(&function);
        let group_name = self.deployment_group_name(&group_id);
        let group = code_deploy::deployment_group(DeploymentGroupParams {
            application,
            group_name: &group_name,
            service_role_arn: settings.code_deploy_role.as_deref(),
            deployment_type: settings.deployment_type,
            alarms: &settings.alarms,
            trigger_configurations: settings.trigger_configurations.as_deref(),
        });

        let version = locator::find_version(template, &function).ok_or_else(|| {
            GenerateError::MissingFunctionVersion {
                function: function.clone(),
            }
        })?;
        let alias_id = format!("{function}Alias{}", settings.alias);
        let before_hook = settings
            .pre_traffic_hook
            .as_deref()
            .map(|hook| self.naming.lambda_logical_id(hook));
        let after_hook = settings
            .post_traffic_hook
            .as_deref()
            .map(|hook| self.naming.lambda_logical_id(hook));
        let alias = lambda::alias(AliasParams {
            name: &settings.alias,
            function: &function,
            version,
            traffic_shifting: Some(TrafficShifting {
                application,
                deployment_group: &group_id,
                before_hook: before_hook.as_deref(),
                after_hook: after_hook.as_deref(),
            }),
        });

        tracing::debug!("{} gets {} and {}", function, group_id, alias_id);
        patch.add(group_id, group);
        patch.add(alias_id.as_str(), alias);

        // Locate against the input template, but start from any copy an
        // earlier function already rewrote so both rewrites survive.
        let dependents = locator::locate_permissions(template, &function)
            .into_iter()
            .chain(locator::locate_events(template, &function));
        for location in dependents {
            let current = patch.get(location.logical_id).unwrap_or(location.resource);
            let rewritten = rewriter::rewrite(current, &location, &alias_id)?;
            patch.replace(location.logical_id, rewritten);
        }
        Ok(())
    }

    fn has_trigger_configurations(patch: &TemplatePatch) -> bool {
        patch
            .iter()
            .any(|(_, operation)| code_deploy::has_trigger_configurations(operation.resource()))
    }

    fn build_code_deploy_role(&self, with_triggers: bool) -> Option<Resource> {
        let global = self.config.global_settings();
        if global.code_deploy_role.is_some() {
            tracing::debug!("CodeDeploy role is managed externally; not generating one");
            return None;
        }
        Some(iam::code_deploy_role(
            global.code_deploy_role_permissions_boundary.as_deref(),
            with_triggers,
        ))
    }

    fn build_execution_role(&self, template: &Template, application: &str) -> Option<(String, Resource)> {
        let logical_id = self.naming.role_logical_id();
        let Some(role) = template.get(&logical_id) else {
            tracing::debug!("No execution role {} in template; skipping hook permissions", logical_id);
            return None;
        };

        let mut group_names: Vec<String> = Vec::new();
        for function in self.config.functions_with_deployment_settings() {
            let has_hooks = self
                .config
                .deployment_settings_for(function)
                .is_some_and(|settings| settings.has_traffic_hooks());
            if !has_hooks {
                continue;
            }
            let group_id = Self::deployment_group_id(&self.naming.lambda_logical_id(function));
            let group_name = self.deployment_group_name(&group_id);
            if !group_names.contains(&group_name) {
                group_names.push(group_name);
            }
        }

        iam::execution_role_with_code_deploy(role, application, &group_names)
            .map(|updated| (logical_id, updated))
    }
}
