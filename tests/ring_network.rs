//! End-to-end `Network::tick` scenarios on a small ring: single-flit delivery, credit
//! return keeping the network live under sustained load, and allocator-strategy
//! interchangeability through the same topology/routing/traffic harness.

mod common;

use calzada_lib::{Network,NetworkBuilderArgument};
use calzada_lib::routing::RingDor;
use calzada_lib::topology::Ring;
use calzada_lib::traffic::UniformTraffic;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn ring_routing(n:usize) -> RingDor { RingDor{ num_routers:n, server_port:2 } }

#[test]
fn single_packet_crosses_the_ring_and_is_consumed()
{
	let ring = Ring::new(4);
	let cv = common::router_cv(2,4);
	let mut net = Network::new(NetworkBuilderArgument{ cv:&cv, topology:&ring, link_latency:1, credit_latency:1 }).unwrap();
	let routing = ring_routing(4);
	let mut traffic = UniformTraffic::new(4, 1.0, 1);
	let mut rng : StdRng = SeedableRng::seed_from_u64(42);

	let mut finished = false;
	for _ in 0..100
	{
		net.tick(&routing, &mut traffic, &mut rng);
		if traffic.is_finished() { finished = true; break; }
	}
	assert!(finished, "a single injected packet should eventually be ejected");
}

#[test]
fn sustained_load_drains_without_deadlocking()
{
	let ring = Ring::new(6);
	let cv = common::router_cv(2,4);
	let mut net = Network::new(NetworkBuilderArgument{ cv:&cv, topology:&ring, link_latency:1, credit_latency:1 }).unwrap();
	let routing = ring_routing(6);
	let mut traffic = UniformTraffic::new(6, 0.7, 200);
	let mut rng : StdRng = SeedableRng::seed_from_u64(7);

	let mut finished = false;
	for _ in 0..20_000
	{
		net.tick(&routing, &mut traffic, &mut rng);
		if traffic.is_finished() { finished = true; break; }
	}
	assert!(finished, "200 packets at load 0.7 on a 6-router ring should drain well within 20000 cycles");
}

#[test]
fn wavefront_and_islip_allocators_both_drain_the_same_workload()
{
	for sw_allocator in [common::wavefront(false), common::islip(2)]
	{
		let ring = Ring::new(4);
		let cv = common::router_cv_with(2, 4, common::separable_input_first(), sw_allocator, 0, false);
		let mut net = Network::new(NetworkBuilderArgument{ cv:&cv, topology:&ring, link_latency:1, credit_latency:1 }).unwrap();
		let routing = ring_routing(4);
		let mut traffic = UniformTraffic::new(4, 0.6, 60);
		let mut rng : StdRng = SeedableRng::seed_from_u64(3);

		let mut finished = false;
		for _ in 0..5000
		{
			net.tick(&routing, &mut traffic, &mut rng);
			if traffic.is_finished() { finished = true; break; }
		}
		assert!(finished);
	}
}

#[test]
fn speculative_switch_allocation_also_drains_the_workload()
{
	let ring = Ring::new(4);
	let cv = common::router_cv_with(2, 4, common::separable_input_first(), common::separable_output_first(), 2, true);
	let mut net = Network::new(NetworkBuilderArgument{ cv:&cv, topology:&ring, link_latency:1, credit_latency:1 }).unwrap();
	let routing = ring_routing(4);
	let mut traffic = UniformTraffic::new(4, 0.6, 60);
	let mut rng : StdRng = SeedableRng::seed_from_u64(9);

	let mut finished = false;
	for _ in 0..5000
	{
		net.tick(&routing, &mut traffic, &mut rng);
		if traffic.is_finished() { finished = true; break; }
	}
	assert!(finished, "speculative allocation with hold_switch_for_packet should still drain correctly");
}
