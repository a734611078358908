//! "Advanced" mode compiler: explicit per-channel routes straight off the
//! document, with no bass-management synthesis.

use crate::document::AdvancedRouteSpec;
use crate::draft::RouteDraft;
use crate::error::ConfigError;
use sp_core::Channel;
use std::collections::HashMap;

pub fn compile_advanced(
    advanced: &HashMap<String, Vec<AdvancedRouteSpec>>,
) -> Result<HashMap<Channel, Vec<RouteDraft>>, ConfigError> {
    let mut routes: HashMap<Channel, Vec<RouteDraft>> = HashMap::new();
    for (capture_name, route_specs) in advanced {
        let capture = Channel::from_name(capture_name)?;
        let mut drafts = Vec::with_capacity(route_specs.len());
        for (i, route_spec) in route_specs.iter().enumerate() {
            let path = format!("advanced/{capture_name}/{i}");
            let destination = Channel::from_name(&route_spec.out)?;
            let condition = match &route_spec.condition {
                Some(cond) => Some(Channel::from_name(&cond.silent).map_err(|_| {
                    ConfigError::invalid(path.clone(), format!("unknown silent-condition channel {:?}", cond.silent))
                })?),
                None => None,
            };
            drafts.push(RouteDraft {
                destination,
                gain_db: route_spec.gain,
                invert: route_spec.invert,
                delay_ms: route_spec.delay.as_ref().map(|d| d.millis()),
                filters: route_spec.filters.clone(),
                condition,
            });
        }
        routes.entry(capture).or_default().extend(drafts);
    }
    Ok(routes)
}
