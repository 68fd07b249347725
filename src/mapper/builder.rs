use super::dns::generate_dns_config;
use super::profiles::generate_user_profiles;
use super::Mapper;
use crate::error::{MapperError, Result};
use crate::model::{AclPolicy, Machine};
use crate::protocol::{DebugFlags, MapResponse};
use chrono::Utc;
use tracing::{debug, error, trace};

impl Mapper {
    /// Assemble the logical map response for `machine` without encoding it.
    ///
    /// Peers are filtered by the compiled ACL rules unless the rule set is
    /// empty, in which case every candidate peer is visible.
    ///
    /// # Errors
    /// - `MapperError::NodeConversion` if the node or a peer cannot be converted
    /// - `MapperError::PeerFetch` if the candidate peers cannot be listed
    /// - `MapperError::AclRuleGeneration` if the policy cannot be compiled
    pub fn full_map_response(
        &self,
        machine: &Machine,
        policy: Option<&AclPolicy>,
    ) -> Result<MapResponse> {
        let settings = &self.settings;
        let dns_template = settings.dns_config.as_ref();

        let node = self
            .store
            .resolve_node(machine, policy, dns_template)
            .map_err(|e| {
                error!(machine = %machine.hostname, error = %e, "Cannot convert machine to node");
                MapperError::NodeConversion(e)
            })?;

        let peers = self.store.list_peers(machine).map_err(|e| {
            error!(machine = %machine.hostname, error = %e, "Cannot fetch peers");
            MapperError::PeerFetch(e)
        })?;

        let (rules, ssh_policy) = self
            .acl
            .generate_filter_rules(policy, &peers, settings.strip_email_domain)
            .map_err(|e| {
                error!(machine = %machine.hostname, error = %e, "Cannot generate filter rules");
                MapperError::AclRuleGeneration(e)
            })?;

        let candidates = peers.len();
        let peers = if rules.is_empty() {
            peers
        } else {
            self.acl.filter_by_acl(machine, peers, &rules)
        };
        debug!(candidates, visible = peers.len(), rules = rules.len(), "Filtered peers");

        let user_profiles = generate_user_profiles(machine, &peers, &settings.base_domain);

        let peer_nodes = self
            .store
            .resolve_peers(&peers, policy, dns_template)
            .map_err(|e| {
                error!(machine = %machine.hostname, error = %e, "Cannot convert peers to nodes");
                MapperError::NodeConversion(e)
            })?;

        let dns_config =
            generate_dns_config(dns_template, &settings.base_domain, machine, &peers);

        let response = MapResponse {
            keep_alive: false,
            node: Some(node),
            peers: peer_nodes,
            derp_map: settings.derp_map.clone(),
            dns_config,
            domain: settings.base_domain.clone(),
            collect_services: Some(false),
            packet_filter: rules,
            user_profiles,
            ssh_policy,
            control_time: Some(Utc::now()),
            debug: Some(DebugFlags {
                disable_log_tail: !settings.logtail,
                randomize_client_port: settings.random_client_port,
            }),
        };

        trace!(summary = %response.summary(), "Generated map response");

        Ok(response)
    }
}
