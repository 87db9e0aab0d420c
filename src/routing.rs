/*!

The routing function is an external collaborator: a pure function from (router, flit,
input channel) to a candidate [`OutputSet`](crate::buffer::OutputSet), consulted exactly
once per head flit by `Router::internal_step`. This module only fixes the trait boundary
the pipeline calls through, plus a couple of minimal example implementations used by the
router's own tests; richer routing families (dimension-order, Valiant, up*/down*, adaptive
deroute) live above this core and are out of scope here.

*/

use crate::buffer::OutputSet;
use crate::flit::Flit;
use crate::router::Router;

/// Must populate `out` with at least one legal `(out_port, vc_range, priority)` entry for
/// every reachable destination, and must itself consult `router.is_faulty_output` to
/// avoid broken links; the router never filters candidates on the routing function's
/// behalf.
pub trait Routing : std::fmt::Debug
{
	fn next(&self, router:&Router, flit:&Flit, in_channel:usize, inject:bool, out:&mut OutputSet);
}

/// Always offers the same single `(out_port, vc)` pair, regardless of flit or input
/// channel. Useful for unit tests that want to pin a router's behavior down to one path.
#[derive(Debug,Clone,Copy)]
pub struct Fixed
{
	pub out_port: usize,
	pub out_vc: usize,
}

impl Routing for Fixed
{
	fn next(&self, router:&Router, _flit:&Flit, _in_channel:usize, _inject:bool, out:&mut OutputSet)
	{
		if !router.is_faulty_output(self.out_port)
		{
			out.add(self.out_port, self.out_vc, self.out_vc, 0);
		}
	}
}

/// Dimension-order routing on a ring: advances towards `dest` along whichever direction
/// (port 0 = decrement, port 1 = increment) is shorter, one hop per router index; once at
/// the destination router, offers the local `server_port` for ejection instead. Offers
/// every VC of the chosen port as equally good.
#[derive(Debug,Clone,Copy)]
pub struct RingDor
{
	pub num_routers: usize,
	pub server_port: usize,
}

impl Routing for RingDor
{
	fn next(&self, router:&Router, flit:&Flit, _in_channel:usize, _inject:bool, out:&mut OutputSet)
	{
		let here = router.index();
		let out_port = if here == flit.dest
		{
			self.server_port
		}
		else
		{
			let n = self.num_routers;
			let forward_distance = (flit.dest + n - here) % n;
			let backward_distance = (here + n - flit.dest) % n;
			if forward_distance <= backward_distance { 1 } else { 0 }
		};
		if router.is_faulty_output(out_port) { return; }
		let num_vcs = router.num_output_vcs(out_port);
		if num_vcs>0 { out.add(out_port, 0, num_vcs-1, 0); }
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use crate::router::RouterBuilderArgument;
	use crate::config::ConfigurationValue;

	fn minimal_cv() -> ConfigurationValue
	{
		ConfigurationValue::Object("IQRouter".to_string(), vec![
			("num_vcs".to_string(), ConfigurationValue::Number(2.0)),
			("vc_buf_size".to_string(), ConfigurationValue::Number(4.0)),
		])
	}

	#[test]
	fn fixed_routing_offers_its_configured_pair()
	{
		let router = Router::new(RouterBuilderArgument{ cv:&minimal_cv(), router_index:0, num_inputs:2, num_outputs:2 }).unwrap();
		let routing = Fixed{ out_port:1, out_vc:0 };
		let flit = Flit{ head:true, tail:true, ..Flit::default() };
		let mut out = OutputSet::new();
		routing.next(&router,&flit,0,false,&mut out);
		assert!(out.iter().any(|e|e.out_port==1));
	}

	#[test]
	fn ring_dor_offers_the_server_port_at_destination()
	{
		let router = Router::new(RouterBuilderArgument{ cv:&minimal_cv(), router_index:2, num_inputs:3, num_outputs:3 }).unwrap();
		let routing = RingDor{ num_routers:4, server_port:2 };
		let flit = Flit{ head:true, tail:true, dest:2, ..Flit::default() };
		let mut out = OutputSet::new();
		routing.next(&router,&flit,0,false,&mut out);
		assert!(out.iter().any(|e|e.out_port==2));
	}

	#[test]
	fn ring_dor_picks_the_shorter_arc_when_not_at_destination()
	{
		let router = Router::new(RouterBuilderArgument{ cv:&minimal_cv(), router_index:0, num_inputs:3, num_outputs:3 }).unwrap();
		let routing = RingDor{ num_routers:4, server_port:2 };
		let flit = Flit{ head:true, tail:true, dest:1, ..Flit::default() };
		let mut out = OutputSet::new();
		routing.next(&router,&flit,0,false,&mut out);
		assert!(out.iter().any(|e|e.out_port==1));
		assert!(!out.iter().any(|e|e.out_port==2));
	}
}
