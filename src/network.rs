/*!

Owns every `Router` plus the `Channel`s wiring them (and the servers) together, and drives
the per-cycle tick: `read_inputs` on every router, then `internal_step`, then
`write_outputs`, in that strict order (§9). The topology, routing function and traffic
manager are supplied by the caller as trait objects; this module only wires them together
and owns the simulation clock.

*/

use std::cell::RefCell;
use std::rc::Rc;
use rand::rngs::StdRng;

use crate::bufferstate::BufferState;
use crate::channel::{CreditChannel,FlitChannel};
use crate::config::ConfigurationValue;
use crate::error::Error;
use crate::flit::Flit;
use crate::router::{Router,RouterBuilderArgument};
use crate::routing::Routing;
use crate::time::Time;
use crate::topology::{Location,Topology};
use crate::traffic::Traffic;

/// A server's own injection/ejection queue: flits waiting to enter the network, and a
/// one-slot landing pad for the flit the attached router's output channel just delivered.
/// `injector_state` mirrors the router's input-VC credit the same way a `Router` mirrors a
/// downstream neighbour's: a server must never push a flit the router has no room for.
struct Server
{
	to_inject: std::collections::VecDeque<Flit>,
	injector_state: BufferState,
	injector_flit_channel: Rc<RefCell<FlitChannel>>,
	injector_credit_channel: Rc<RefCell<CreditChannel>>,
	ejector_flit_channel: Rc<RefCell<FlitChannel>>,
	ejector_credit_channel: Rc<RefCell<CreditChannel>>,
}

pub struct NetworkBuilderArgument<'a>
{
	pub cv: &'a ConfigurationValue,
	pub topology: &'a dyn Topology,
	pub link_latency: usize,
	pub credit_latency: usize,
}

/// The full cycle-accurate simulation: every router, every channel between them and their
/// attached servers, and the clock.
pub struct Network
{
	routers: Vec<Router>,
	servers: Vec<Server>,
	current_cycle: Time,
}

impl Network
{
	/// Builds one `Router` per `topology.num_routers()` from `cv`, wires every router port
	/// and server port according to `topology.neighbour`/`server_neighbour`, and leaves
	/// genuinely unconnected ports (`Location::None`) without a channel.
	pub fn new(arg:NetworkBuilderArgument) -> Result<Network,Error>
	{
		let num_routers = arg.topology.num_routers();
		let num_servers = arg.topology.num_servers();

		let mut routers = Vec::with_capacity(num_routers);
		for r in 0..num_routers
		{
			// The topology tells us how many ports a router has by how many distinct
			// `neighbour` indices resolve to something other than `Location::None`; since
			// this core does not own a port-count API on `Topology`, the caller's router
			// config itself is authoritative via `num_inputs`/`num_outputs` passed below.
			let num_ports = Self::port_count(arg.topology, r);
			routers.push(Router::new(RouterBuilderArgument{ cv:arg.cv, router_index:r, num_inputs:num_ports, num_outputs:num_ports })?);
		}

		// Router <-> router links. Each unordered pair of (router,port) <-> (router,port)
		// is wired exactly once, from the lower router index's perspective, to avoid
		// building the same Channel pair twice.
		for r in 0..num_routers
		{
			let num_ports = Self::port_count(arg.topology, r);
			for p in 0..num_ports
			{
				if let (Location::RouterPort{ router_index:other_r, router_port:other_p }, _class) = arg.topology.neighbour(r,p)
				{
					if r < other_r || (r==other_r && p<other_p)
					{
						let flit_ch = Rc::new(RefCell::new(FlitChannel::new(arg.link_latency, r, p, other_r, other_p)));
						let credit_ch = Rc::new(RefCell::new(CreditChannel::new(arg.credit_latency)));
						routers[r].add_output_channel(p, flit_ch.clone());
						routers[other_r].add_input_channel(other_p, flit_ch);
						routers[other_r].add_input_credit_channel(other_p, credit_ch.clone());
						routers[r].add_output_credit_channel(p, credit_ch);
					}
				}
			}
		}

		// Router <-> server links.
		let mut servers = Vec::with_capacity(num_servers);
		for s in 0..num_servers
		{
			let (location,_class) = arg.topology.server_neighbour(s);
			let (router_index,router_port) = match location
			{
				Location::RouterPort{ router_index, router_port } => (router_index,router_port),
				_ => return Err(error!(IllFormedConfiguration,arg.cv.clone()).with_message(format!("server {} has no router neighbour",s))),
			};

			let injector_flit = Rc::new(RefCell::new(FlitChannel::new(arg.link_latency, num_routers+s, 0, router_index, router_port)));
			let injector_credit = Rc::new(RefCell::new(CreditChannel::new(arg.credit_latency)));
			routers[router_index].add_input_channel(router_port, injector_flit.clone());
			routers[router_index].add_input_credit_channel(router_port, injector_credit.clone());

			let ejector_flit = Rc::new(RefCell::new(FlitChannel::new(arg.link_latency, router_index, router_port, num_routers+s, 0)));
			let ejector_credit = Rc::new(RefCell::new(CreditChannel::new(arg.credit_latency)));
			routers[router_index].add_output_channel(router_port, ejector_flit.clone());
			routers[router_index].add_output_credit_channel(router_port, ejector_credit.clone());

			let target_buffer = routers[router_index].get_buffer(router_port);
			let num_vcs = target_buffer.num_vcs();
			let vc_size = target_buffer.vcs[0].vc_size();

			servers.push(Server{
				to_inject: std::collections::VecDeque::new(),
				injector_state: BufferState::new(num_vcs, vc_size),
				injector_flit_channel: injector_flit,
				injector_credit_channel: injector_credit,
				ejector_flit_channel: ejector_flit,
				ejector_credit_channel: ejector_credit,
			});
		}

		Ok(Network{ routers, servers, current_cycle:0 })
	}

	/// A router's number of ports is the highest port index any neighbour query
	/// (router-side or server-side) resolves to something other than `None`, plus one;
	/// callers whose topology needs an exact count are expected to size their
	/// `ConfigurationValue` router block consistently with this.
	fn port_count(topology:&dyn Topology, router_index:usize) -> usize
	{
		let mut count = 0;
		loop
		{
			match topology.neighbour(router_index, count)
			{
				(Location::None,_) if count>0 => break,
				(Location::None,_) => { count += 1; break; },
				_ => count += 1,
			}
			if count > 4096 { break; } // defensive bound against a misbehaving Topology impl
		}
		count
	}

	pub fn num_routers(&self) -> usize { self.routers.len() }
	pub fn num_servers(&self) -> usize { self.servers.len() }
	pub fn router(&self, index:usize) -> &Router { &self.routers[index] }
	pub fn current_cycle(&self) -> Time { self.current_cycle }

	/// Runs exactly one cycle: traffic injection/consumption, then the three-phase router
	/// tick (`read_inputs` on every router, `internal_step` on every router, `write_outputs`
	/// on every router), in that order across the whole network.
	pub fn tick(&mut self, routing:&dyn Routing, traffic:&mut dyn Traffic, rng:&mut StdRng)
	{
		self.inject_traffic(traffic, rng);

		for r in self.routers.iter_mut() { r.read_inputs(); }
		for s in self.servers.iter_mut()
		{
			if let Some(flit) = s.ejector_flit_channel.borrow_mut().receive()
			{
				traffic.consume(&flit, self.current_cycle);
				s.ejector_credit_channel.borrow_mut().send(Some(crate::credit::Credit::for_vc(flit.vc)));
			}
			else
			{
				s.ejector_credit_channel.borrow_mut().send(None);
			}
			if let Some(credit) = s.injector_credit_channel.borrow_mut().receive()
			{
				s.injector_state.process_credit(&credit);
			}
		}

		for r in self.routers.iter_mut() { r.internal_step(routing, rng); }

		for r in self.routers.iter_mut() { r.write_outputs(); }
		for s in self.servers.iter_mut()
		{
			// Every packet this minimal traffic generates is single-flit and always
			// targets VC 0, so availability never needs separate tracking from credit.
			let next = match s.to_inject.front()
			{
				Some(flit) if s.injector_state.has_credit(flit.vc) =>
				{
					let flit = s.to_inject.pop_front().unwrap();
					s.injector_state.sending_flit(flit.vc, flit.tail);
					Some(flit)
				},
				_ => None,
			};
			s.injector_flit_channel.borrow_mut().send(next);
		}

		self.current_cycle += 1;
	}

	fn inject_traffic(&mut self, traffic:&mut dyn Traffic, rng:&mut StdRng)
	{
		for (index,server) in self.servers.iter_mut().enumerate()
		{
			if traffic.should_generate(index, self.current_cycle, rng)
			{
				for flit in traffic.generate_packet(index, self.current_cycle, rng)
				{
					server.to_inject.push_back(flit);
				}
			}
		}
	}
}
