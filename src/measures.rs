/*!

Activity and utilization counters layered over the pipeline. These are pure observers:
sampling them never changes simulated behavior, matching §4.6's activity monitors
(`switch_monitor`, `buffer_monitor`) which increment per-class counters on every
read/write/traversal but never feed back into the allocators or buffers themselves.

*/

use crate::network::Network;
use crate::router::{ActivityCounters,Router};

/// Jain's fairness index over a set of per-entity counts: 1.0 when every entity carries
/// equal load, `1/n` when all load concentrates on one entity. Used to report how evenly
/// servers generate/consume traffic, the way `jain_server_consumed_phits` does elsewhere
/// in this codebase family.
pub fn jain<I:Iterator<Item=f64>>(iter:I) -> f64
{
	let (n,sum,sum_sq) = iter.fold((0usize,0.0,0.0), |(n,s,sq),x| (n+1, s+x, sq+x*x));
	if n==0 || sum_sq==0.0 { return 1.0; }
	(sum*sum) / (n as f64 * sum_sq)
}

/// A snapshot of one router's activity counters plus its current per-input-VC occupancy.
/// Taken on demand; does not itself track history.
#[derive(Debug,Clone)]
pub struct RouterMonitor
{
	pub index: usize,
	pub activity: ActivityCounters,
	/// `vc_occupancy[port][vc]` = flits currently queued in that VC.
	pub vc_occupancy: Vec<Vec<usize>>,
	/// `link_active_cycles[port]` = cumulative cycles that output `port` has carried a flit.
	pub link_active_cycles: Vec<u64>,
}

impl RouterMonitor
{
	pub fn sample(router:&Router) -> RouterMonitor
	{
		let vc_occupancy = (0..router.num_inputs()).map(|p|
		{
			let buffer = router.get_buffer(p);
			buffer.vcs.iter().map(|vc|vc.occupancy()).collect()
		}).collect();
		let link_active_cycles = (0..router.num_outputs()).map(|p|router.output_link_active_cycles(p)).collect();
		RouterMonitor{ index: router.index(), activity: router.activity, vc_occupancy, link_active_cycles }
	}
}

/// A snapshot across the whole network: per-router monitors plus the derived aggregate
/// figures a result dump would report (total switch/VC allocations, per-link utilization
/// averaged over the elapsed cycles).
#[derive(Debug,Clone)]
pub struct NetworkMeasurement
{
	pub routers: Vec<RouterMonitor>,
	pub elapsed_cycles: u64,
}

impl NetworkMeasurement
{
	pub fn sample(network:&Network, elapsed_cycles:u64) -> NetworkMeasurement
	{
		let routers = (0..network.num_routers()).map(|i|RouterMonitor::sample(network.router(i))).collect();
		NetworkMeasurement{ routers, elapsed_cycles }
	}

	pub fn total_vc_allocations(&self) -> u64
	{
		self.routers.iter().map(|r|r.activity.vc_allocations).sum()
	}
	pub fn total_switch_allocations(&self) -> u64
	{
		self.routers.iter().map(|r|r.activity.switch_allocations).sum()
	}
	pub fn total_speculative_allocations(&self) -> u64
	{
		self.routers.iter().map(|r|r.activity.speculative_allocations).sum()
	}

	/// Average fraction of cycles, over every output link in the network, on which a flit
	/// traversed it. 1.0 means every link carried a flit every elapsed cycle.
	pub fn average_link_utilization(&self) -> f64
	{
		if self.elapsed_cycles==0 { return 0.0; }
		let (total_active,total_links) = self.routers.iter().fold((0u64,0u64), |(a,l),r|
		(
			a + r.link_active_cycles.iter().sum::<u64>(),
			l + r.link_active_cycles.len() as u64,
		));
		if total_links==0 { return 0.0; }
		total_active as f64 / self.elapsed_cycles as f64 / total_links as f64
	}

	/// Jain fairness index of per-router switch-allocation counts: close to 1 when load is
	/// spread evenly across the network, lower when a handful of routers carry most traffic.
	pub fn switch_allocation_fairness(&self) -> f64
	{
		jain(self.routers.iter().map(|r|r.activity.switch_allocations as f64))
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::config::ConfigurationValue;
	use crate::network::NetworkBuilderArgument;
	use crate::routing::RingDor;
	use crate::topology::Ring;
	use crate::traffic::UniformTraffic;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn jain_index_is_one_for_equal_shares()
	{
		assert!((jain(vec![4.0,4.0,4.0].into_iter()) - 1.0).abs() < 1e-9);
	}

	#[test]
	fn jain_index_drops_when_one_entity_dominates()
	{
		let index = jain(vec![100.0,0.0,0.0,0.0].into_iter());
		assert!((index - 0.25).abs() < 1e-9);
	}

	#[test]
	fn jain_index_on_empty_input_is_one()
	{
		assert_eq!(jain(std::iter::empty()), 1.0);
	}

	fn router_cv() -> ConfigurationValue
	{
		ConfigurationValue::Object("IQRouter".to_string(), vec![
			("num_vcs".to_string(), ConfigurationValue::Number(2.0)),
			("vc_buf_size".to_string(), ConfigurationValue::Number(4.0)),
		])
	}

	#[test]
	fn network_measurement_reports_activity_after_running_traffic()
	{
		let ring = Ring::new(4);
		let cv = router_cv();
		let mut net = Network::new(NetworkBuilderArgument{ cv:&cv, topology:&ring, link_latency:1, credit_latency:1 }).unwrap();
		let routing = RingDor{ num_routers:4, server_port:2 };
		let mut traffic = UniformTraffic::new(4, 0.5, 8);
		let mut rng : StdRng = SeedableRng::seed_from_u64(7);

		for _ in 0..500
		{
			net.tick(&routing, &mut traffic, &mut rng);
			if traffic.is_finished() { break; }
		}

		let measurement = NetworkMeasurement::sample(&net, net.current_cycle());
		assert_eq!(measurement.routers.len(), 4);
		assert!(measurement.total_switch_allocations() > 0, "some flit should have crossed a crossbar by now");
		assert!(measurement.average_link_utilization() >= 0.0);
		assert!(measurement.average_link_utilization() <= 1.0);
	}
}
