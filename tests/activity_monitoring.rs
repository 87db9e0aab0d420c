//! Activity monitoring is a pure observer: sampling `NetworkMeasurement` must never change
//! what a bitwise-identical rerun of the same ticks would have produced.

mod common;

use calzada_lib::{Network,NetworkBuilderArgument};
use calzada_lib::measures::NetworkMeasurement;
use calzada_lib::routing::RingDor;
use calzada_lib::topology::Ring;
use calzada_lib::traffic::UniformTraffic;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn run(sample_every_cycle:bool) -> (u64,u64)
{
	let ring = Ring::new(4);
	let cv = common::router_cv(2,4);
	let mut net = Network::new(NetworkBuilderArgument{ cv:&cv, topology:&ring, link_latency:1, credit_latency:1 }).unwrap();
	let routing = RingDor{ num_routers:4, server_port:2 };
	let mut traffic = UniformTraffic::new(4, 0.5, 40);
	let mut rng : StdRng = SeedableRng::seed_from_u64(11);

	for _ in 0..3000
	{
		net.tick(&routing, &mut traffic, &mut rng);
		if sample_every_cycle { let _ = NetworkMeasurement::sample(&net, net.current_cycle()); }
		if traffic.is_finished() { break; }
	}
	let final_measurement = NetworkMeasurement::sample(&net, net.current_cycle());
	(final_measurement.total_switch_allocations(), net.current_cycle())
}

#[test]
fn sampling_every_cycle_does_not_perturb_the_simulation()
{
	let (allocations_sampled, cycles_sampled) = run(true);
	let (allocations_unsampled, cycles_unsampled) = run(false);
	assert_eq!(allocations_sampled, allocations_unsampled);
	assert_eq!(cycles_sampled, cycles_unsampled);
}

#[test]
fn link_utilization_and_fairness_stay_in_unit_range()
{
	let ring = Ring::new(5);
	let cv = common::router_cv(2,4);
	let mut net = Network::new(NetworkBuilderArgument{ cv:&cv, topology:&ring, link_latency:1, credit_latency:1 }).unwrap();
	let routing = RingDor{ num_routers:5, server_port:2 };
	let mut traffic = UniformTraffic::new(5, 0.8, 150);
	let mut rng : StdRng = SeedableRng::seed_from_u64(21);

	for _ in 0..10_000
	{
		net.tick(&routing, &mut traffic, &mut rng);
		if traffic.is_finished() { break; }
	}

	let measurement = NetworkMeasurement::sample(&net, net.current_cycle());
	let util = measurement.average_link_utilization();
	assert!(util >= 0.0 && util <= 1.0);
	let fairness = measurement.switch_allocation_fairness();
	assert!(fairness > 0.0 && fairness <= 1.0 + 1e-9);
	assert!(measurement.total_vc_allocations() > 0);
	assert!(measurement.total_switch_allocations() > 0);
}
