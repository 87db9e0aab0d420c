/*!

Per-cycle pipeline orchestration: owns the input `Buffer`s, the downstream `BufferState`
mirrors, the VC/SW allocators, and the two internal pipeline FIFOs (crossbar traversal and
credit return). Exposes exactly three per-cycle entry points, called by `Network` in strict
order every tick: [`Router::read_inputs`], [`Router::internal_step`], [`Router::write_outputs`].

*/

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use rand::rngs::StdRng;

use crate::allocator::{Allocator,AllocRequest,Grant,AllocatorBuilderArgument,new_allocator};
use crate::buffer::{Buffer,OutputSet,PriorityPolicy,VcState};
use crate::bufferstate::BufferState;
use crate::channel::{Channel,CreditChannel,FlitChannel};
use crate::config::ConfigurationValue;
use crate::credit::Credit;
use crate::error::{Error,ErrorKind};
use crate::flit::Flit;
use crate::routing::Routing;
use crate::time::Time;

/// How a speculative grant on one allocator is reconciled against the non-speculative
/// allocator's result in the same cycle (only meaningful when `speculative==2`).
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum FilterSpecGrants
{
	/// Drop every speculative grant if the non-speculative allocator granted anything at all.
	AnyNonspecGnts,
	/// Drop a speculative grant if its output has any non-speculative request.
	ConflNonspecReqs,
	/// Drop a speculative grant if its output has a non-speculative grant.
	ConflNonspecGnts,
}

/// A flit in flight inside the crossbar-traversal pipeline, tagged with the physical
/// output port it is headed for (VC already rewritten to the assigned `out_vc`).
#[derive(Debug,Clone)]
struct CrossbarTransit
{
	out_port: usize,
	flit: Flit,
}

#[derive(Debug,Default,Clone,Copy)]
pub struct ActivityCounters
{
	pub vc_allocations: u64,
	pub switch_allocations: u64,
	pub speculative_allocations: u64,
	pub buffer_pushes: u64,
	pub buffer_pops: u64,
}

pub struct RouterBuilderArgument<'a>
{
	pub cv: &'a ConfigurationValue,
	pub router_index: usize,
	pub num_inputs: usize,
	pub num_outputs: usize,
}

/// An input-queued, virtual-channel router running the RC -> VA -> SA -> ST pipeline.
pub struct Router
{
	index: usize,
	num_inputs: usize,
	num_outputs: usize,
	num_vcs: usize,

	inputs: Vec<Buffer>,
	outputs: Vec<BufferState>,
	faulty_outputs: std::collections::HashSet<usize>,

	input_flit_channels: Vec<Option<Rc<RefCell<FlitChannel>>>>,
	output_flit_channels: Vec<Option<Rc<RefCell<FlitChannel>>>>,
	/// Sends credits upstream, one per input port.
	input_credit_channels: Vec<Option<Rc<RefCell<CreditChannel>>>>,
	/// Receives credits from downstream, one per output port.
	output_credit_channels: Vec<Option<Rc<RefCell<CreditChannel>>>>,

	priority_policy: PriorityPolicy,
	routing_delay: Time,
	vc_alloc_delay: Time,
	sw_alloc_delay: Time,
	credit_delay: Time,
	hold_switch_for_packet: bool,
	/// 0 = pure VA->SA, 1 = single allocator with priority tiering, 2 = two allocators + filter.
	speculative: u8,
	filter_spec_grants: FilterSpecGrants,

	vc_allocator: Box<dyn Allocator>,
	sw_allocator: Box<dyn Allocator>,
	spec_sw_allocator: Option<Box<dyn Allocator>>,

	/// Internal processing pipeline between an SA grant and its landing in the per-output
	/// departure slot; length `st_prepare_delay + st_final_delay`.
	crossbar_pipeline: Channel<Vec<CrossbarTransit>>,
	/// One internal processing pipeline per input, length `credit_delay`.
	credit_pipeline: Vec<Channel<Credit>>,
	departure: Vec<Option<Flit>>,
	credit_departure: Vec<Option<Credit>>,

	/// `(input,in_vc) -> (out_port,out_vc)` while a packet holds the crossbar connection.
	held_crossbar: HashMap<(usize,usize),(usize,usize)>,

	current_cycle: Time,
	pub activity: ActivityCounters,
}

const SPEC_PRIORITY_PENALTY: i64 = 1_000_000;

impl Router
{
	pub fn new(arg:RouterBuilderArgument) -> Result<Router,Error>
	{
		let mut num_vcs = 1usize;
		let mut vc_buf_size = 4usize;
		let mut shared_buf_size = 0usize;
		let mut speculative = 0u8;
		let mut filter_spec_grants = FilterSpecGrants::AnyNonspecGnts;
		let mut vc_allocator_cv = ConfigurationValue::Object("SeparableInputFirst".to_string(),vec![]);
		let mut sw_allocator_cv = ConfigurationValue::Object("SeparableInputFirst".to_string(),vec![]);
		let mut routing_delay : Time = 0;
		let mut vc_alloc_delay : Time = 1;
		let mut sw_alloc_delay : Time = 1;
		let mut st_prepare_delay : Time = 1;
		let mut st_final_delay : Time = 0;
		let mut credit_delay : Time = 1;
		let mut hold_switch_for_packet = false;
		let mut priority_policy = PriorityPolicy::None;
		let mut input_speedup = 1usize;
		let mut output_speedup = 1usize;

		match_object!(arg.cv, "IQRouter", value,
			"num_vcs" => num_vcs = value.as_usize()?,
			"vc_buf_size" => vc_buf_size = value.as_usize()?,
			"shared_buf_size" => shared_buf_size = value.as_usize()?,
			"speculative" => speculative = value.as_usize()? as u8,
			"filter_spec_grants" => filter_spec_grants = match value.as_str()?
			{
				"any_nonspec_gnts" => FilterSpecGrants::AnyNonspecGnts,
				"confl_nonspec_reqs" => FilterSpecGrants::ConflNonspecReqs,
				"confl_nonspec_gnts" => FilterSpecGrants::ConflNonspecGnts,
				other => return Err(error!(IllFormedConfiguration,arg.cv.clone()).with_message(format!("unknown filter_spec_grants `{}`",other))),
			},
			"vc_allocator" => vc_allocator_cv = value.clone(),
			"sw_allocator" => sw_allocator_cv = value.clone(),
			"routing_delay" => routing_delay = value.as_time()?,
			"vc_alloc_delay" => vc_alloc_delay = value.as_time()?,
			"sw_alloc_delay" => sw_alloc_delay = value.as_time()?,
			"st_prepare_delay" => st_prepare_delay = value.as_time()?,
			"st_final_delay" => st_final_delay = value.as_time()?,
			"credit_delay" => credit_delay = value.as_time()?,
			"hold_switch_for_packet" => hold_switch_for_packet = value.as_bool()?,
			"input_speedup" => input_speedup = value.as_usize()?,
			"output_speedup" => output_speedup = value.as_usize()?,
			"priority" => priority_policy = match value.as_str()?
			{
				"none" => PriorityPolicy::None,
				"age" | "local_age" => PriorityPolicy::LocalAge,
				"queue_length" => PriorityPolicy::QueueLength,
				"hop_count" => PriorityPolicy::HopCount,
				"other" => PriorityPolicy::Other,
				other => return Err(error!(UndefinedPriorityPolicy,other.to_string())),
			},
		);

		// `error!` only builds tuple-style variants; InvalidStageDelay carries named fields,
		// so it is constructed directly rather than through the macro.
		if vc_alloc_delay < 1
		{
			return Err(Error::new(source_location!(), ErrorKind::InvalidStageDelay{ field:"vc_alloc_delay", value:vc_alloc_delay as i64 }));
		}
		if sw_alloc_delay < 1
		{
			return Err(Error::new(source_location!(), ErrorKind::InvalidStageDelay{ field:"sw_alloc_delay", value:sw_alloc_delay as i64 }));
		}
		if credit_delay < 1
		{
			return Err(Error::new(source_location!(), ErrorKind::InvalidStageDelay{ field:"credit_delay", value:credit_delay as i64 }));
		}
		if st_prepare_delay + st_final_delay < 1
		{
			return Err(Error::new(source_location!(), ErrorKind::InvalidStageDelay{ field:"st_prepare_delay+st_final_delay", value:(st_prepare_delay+st_final_delay) as i64 }));
		}
		if input_speedup != 1 || output_speedup != 1
		{
			return Err(error!(IllFormedConfiguration,arg.cv.clone()).with_message("input_speedup/output_speedup > 1 are not supported by this core".to_string()));
		}

		let num_inputs = arg.num_inputs;
		let num_outputs = arg.num_outputs;

		let vc_allocator = new_allocator(AllocatorBuilderArgument{ cv:&vc_allocator_cv, num_inputs:num_inputs*num_vcs, num_outputs:num_outputs*num_vcs })?;
		let sw_allocator = new_allocator(AllocatorBuilderArgument{ cv:&sw_allocator_cv, num_inputs, num_outputs })?;
		let spec_sw_allocator = if speculative==2 { Some(new_allocator(AllocatorBuilderArgument{ cv:&sw_allocator_cv, num_inputs, num_outputs })?) } else { None };

		Ok(Router{
			index: arg.router_index,
			num_inputs, num_outputs, num_vcs,
			inputs: (0..num_inputs).map(|_|Buffer::new(num_vcs,vc_buf_size,shared_buf_size)).collect(),
			outputs: (0..num_outputs).map(|_|BufferState::new(num_vcs,vc_buf_size)).collect(),
			faulty_outputs: std::collections::HashSet::new(),
			input_flit_channels: (0..num_inputs).map(|_|None).collect(),
			output_flit_channels: (0..num_outputs).map(|_|None).collect(),
			input_credit_channels: (0..num_inputs).map(|_|None).collect(),
			output_credit_channels: (0..num_outputs).map(|_|None).collect(),
			priority_policy,
			routing_delay, vc_alloc_delay, sw_alloc_delay, credit_delay,
			hold_switch_for_packet,
			speculative,
			filter_spec_grants,
			vc_allocator, sw_allocator, spec_sw_allocator,
			crossbar_pipeline: Channel::new(st_prepare_delay+st_final_delay),
			credit_pipeline: (0..num_inputs).map(|_|Channel::new(credit_delay)).collect(),
			departure: (0..num_outputs).map(|_|None).collect(),
			credit_departure: (0..num_inputs).map(|_|None).collect(),
			held_crossbar: HashMap::new(),
			current_cycle: 0,
			activity: ActivityCounters::default(),
		})
	}

	pub fn index(&self) -> usize { self.index }
	pub fn num_inputs(&self) -> usize { self.num_inputs }
	pub fn num_outputs(&self) -> usize { self.num_outputs }
	pub fn num_output_vcs(&self, _port:usize) -> usize { self.num_vcs }
	pub fn get_buffer(&self, port:usize) -> &Buffer { &self.inputs[port] }
	pub fn get_credit(&self, port:usize, vc:usize) -> i64 { self.outputs[port].credits(vc) }

	/// Cycles on which output `port` has carried a flit, for link-utilization reporting.
	/// 0 for an unconnected port.
	pub fn output_link_active_cycles(&self, port:usize) -> u64
	{
		self.output_flit_channels[port].as_ref().map(|c|c.borrow().active_cycles).unwrap_or(0)
	}

	pub fn is_faulty_output(&self, port:usize) -> bool { self.faulty_outputs.contains(&port) }
	pub fn out_channel_fault(&mut self, port:usize) { self.faulty_outputs.insert(port); }

	pub fn add_input_channel(&mut self, port:usize, channel:Rc<RefCell<FlitChannel>>) { self.input_flit_channels[port] = Some(channel); }
	pub fn add_output_channel(&mut self, port:usize, channel:Rc<RefCell<FlitChannel>>) { self.output_flit_channels[port] = Some(channel); }
	pub fn add_input_credit_channel(&mut self, port:usize, channel:Rc<RefCell<CreditChannel>>) { self.input_credit_channels[port] = Some(channel); }
	pub fn add_output_credit_channel(&mut self, port:usize, channel:Rc<RefCell<CreditChannel>>) { self.output_credit_channels[port] = Some(channel); }

	/// (a) drains an incoming flit per input channel into its target VC's buffer; (b)
	/// applies an incoming credit per output credit channel to the matching `BufferState`.
	pub fn read_inputs(&mut self)
	{
		for q in 0..self.num_inputs
		{
			if let Some(ch) = &self.input_flit_channels[q]
			{
				if let Some(flit) = ch.borrow_mut().receive()
				{
					let vc = flit.vc;
					self.inputs[q].add_flit(vc, flit);
					self.activity.buffer_pushes += 1;
				}
			}
		}
		for p in 0..self.num_outputs
		{
			if let Some(ch) = &self.output_credit_channels[p]
			{
				if let Some(credit) = ch.borrow_mut().receive()
				{
					self.outputs[p].process_credit(&credit);
				}
			}
		}
	}

	/// Runs the RC -> VA -> SA -> ST pipeline stages, in order, for one cycle.
	pub fn internal_step(&mut self, routing:&dyn Routing, rng:&mut StdRng)
	{
		self.refresh_priorities();
		self.step_input_queuing();
		self.step_route_evaluate(routing);
		self.step_vc_allocate(rng);
		let mut freed_credits_per_input : HashMap<usize,Vec<usize>> = HashMap::new();
		let transits = self.step_switch_allocate(rng, &mut freed_credits_per_input);
		self.step_switch_traversal(transits);
		self.step_credit_return(freed_credits_per_input);

		for q in 0..self.num_inputs { self.inputs[q].advance_time(); }
		self.current_cycle += 1;
	}

	/// Pops the departure slots, sending a flit (possibly none) on every output channel
	/// and a credit (possibly none) on every input's credit channel.
	pub fn write_outputs(&mut self)
	{
		for p in 0..self.num_outputs
		{
			let flit = self.departure[p].take();
			if let Some(ch) = &self.output_flit_channels[p] { ch.borrow_mut().send(flit); }
		}
		for q in 0..self.num_inputs
		{
			let credit = self.credit_departure[q].take();
			if let Some(ch) = &self.input_credit_channels[q] { ch.borrow_mut().send(credit); }
		}
	}

	fn refresh_priorities(&mut self)
	{
		let base = self.current_cycle as i64;
		for q in 0..self.num_inputs
		{
			for vc in 0..self.num_vcs
			{
				if self.inputs[q].state(vc) != VcState::Idle
				{
					self.inputs[q].vcs[vc].refresh_priority(self.priority_policy, base);
				}
			}
		}
	}

	/// Step 1: a head flit that just arrived into an Idle VC starts routing.
	fn step_input_queuing(&mut self)
	{
		for q in 0..self.num_inputs
		{
			for vc in 0..self.num_vcs
			{
				if self.inputs[q].state(vc)==VcState::Idle && !self.inputs[q].empty(vc)
				{
					self.inputs[q].set_state(vc,VcState::Routing);
					self.inputs[q].vcs[vc].refresh_priority(self.priority_policy, self.current_cycle as i64);
				}
			}
		}
	}

	/// Step 2: invoke the routing function once the head flit has spent `routing_delay`
	/// cycles in `Routing`; caches the resulting `OutputSet` and transitions onward.
	fn step_route_evaluate(&mut self, routing:&dyn Routing)
	{
		for q in 0..self.num_inputs
		{
			for vc in 0..self.num_vcs
			{
				if self.inputs[q].state(vc)==VcState::Routing && self.inputs[q].state_time(vc)>=self.routing_delay
				{
					let flit = self.inputs[q].front(vc).cloned();
					if let Some(flit) = flit
					{
						let mut out = OutputSet::new();
						routing.next(self, &flit, q, false, &mut out);
						self.inputs[q].set_route_set(vc, out);
						let next = if self.speculative>0 { VcState::VcSpec } else { VcState::VcAlloc };
						self.inputs[q].set_state(vc, next);
					}
				}
			}
		}
	}

	/// Step 3: VC allocation matches expanded `(input,in_vc)` against `(out_port,out_vc)`.
	fn step_vc_allocate(&mut self, rng:&mut StdRng)
	{
		self.vc_allocator.clear();
		for q in 0..self.num_inputs
		{
			for vc in 0..self.num_vcs
			{
				let state = self.inputs[q].state(vc);
				let requesting = state==VcState::VcAlloc || state==VcState::VcSpec;
				if !requesting || self.inputs[q].state_time(vc)<self.vc_alloc_delay { continue; }
				let in_pri = self.inputs[q].vcs[vc].priority;
				let route_set = self.inputs[q].get_route_set(vc).clone();
				for (out_port,out_vc,out_pri) in route_set.expand()
				{
					if self.faulty_outputs.contains(&out_port) { continue; }
					if self.outputs[out_port].is_available_for(out_vc) && self.outputs[out_port].has_credit(out_vc)
					{
						let expanded_in = q*self.num_vcs + vc;
						let expanded_out = out_port*self.num_vcs + out_vc;
						self.vc_allocator.add_request(AllocRequest{ input:expanded_in, output:expanded_out, label:0, in_pri, out_pri });
					}
				}
			}
		}
		let grants = self.vc_allocator.allocate(rng);
		for g in grants
		{
			let in_port = g.input / self.num_vcs;
			let in_vc = g.input % self.num_vcs;
			let out_port = g.output / self.num_vcs;
			let out_vc = g.output % self.num_vcs;
			self.outputs[out_port].take_buffer(out_vc, (in_port,in_vc));
			self.inputs[in_port].set_output(in_vc, out_port, out_vc);
			if self.inputs[in_port].state(in_vc)==VcState::VcSpec
			{
				// Keep the accumulated state_time: this VC has been SA-eligible since it
				// entered VcSpec, so it can still commit a speculative SA grant this cycle.
				self.inputs[in_port].set_state_keep_time(in_vc, VcState::VcSpecGrant);
			}
			else
			{
				self.inputs[in_port].set_state(in_vc, VcState::Active);
			}
			self.activity.vc_allocations += 1;
		}
	}

	/// Step 4: switch allocation over physical ports, with optional speculative bidding;
	/// returns the flits that actually crossed the switch this cycle, tagged with their
	/// destination output port. Freed input VCs are recorded into `freed_credits`.
	fn step_switch_allocate(&mut self, rng:&mut StdRng, freed_credits:&mut HashMap<usize,Vec<usize>>) -> Vec<CrossbarTransit>
	{
		self.sw_allocator.clear();
		if let Some(spec) = self.spec_sw_allocator.as_mut() { spec.clear(); }

		// Packets already holding the crossbar bypass arbitration entirely; mask their
		// output so the allocators cannot also hand it to someone else this cycle. Per
		// §4.6, a held packet releases its hold (rather than sitting masked-but-unserviced)
		// on VC empty or when downstream credit dries up, so a different VC is free to take
		// the output next cycle instead of interleaving with the still-held one this cycle.
		let mut forced : Vec<(usize,usize,usize,usize)> = Vec::new(); // (q,in_vc,out_port,out_vc)
		let mut released : Vec<(usize,usize)> = Vec::new();
		for (&(q,vc),&(out_port,out_vc)) in self.held_crossbar.iter()
		{
			if self.inputs[q].empty(vc) || !self.outputs[out_port].has_credit(out_vc)
			{
				released.push((q,vc));
			}
			else
			{
				forced.push((q,vc,out_port,out_vc));
				self.sw_allocator.mask_output(out_port);
				if let Some(spec) = self.spec_sw_allocator.as_mut() { spec.mask_output(out_port); }
			}
		}
		for key in released { self.held_crossbar.remove(&key); }
		let forced_ports : std::collections::HashSet<usize> = forced.iter().map(|&(_,_,p,_)|p).collect();

		for q in 0..self.num_inputs
		{
			for vc in 0..self.num_vcs
			{
				if self.held_crossbar.contains_key(&(q,vc)) { continue; }
				let state = self.inputs[q].state(vc);
				if self.inputs[q].state_time(vc) < self.sw_alloc_delay { continue; }
				if self.inputs[q].empty(vc) { continue; }
				match state
				{
					VcState::Active =>
					{
						let (out_port,out_vc) = match self.inputs[q].output(vc) { Some(x)=>x, None=>continue };
						if forced_ports.contains(&out_port) { continue; }
						if self.outputs[out_port].has_credit(out_vc)
						{
							let pri = self.inputs[q].vcs[vc].priority + if self.speculative==1 { SPEC_PRIORITY_PENALTY } else { 0 };
							self.sw_allocator.add_request(AllocRequest{ input:q, output:out_port, label:vc as u64, in_pri:pri, out_pri:pri });
						}
					},
					VcState::VcSpec | VcState::VcSpecGrant if self.speculative>0 =>
					{
						let route_set = self.inputs[q].get_route_set(vc).clone();
						let pri = self.inputs[q].vcs[vc].priority;
						for (out_port,out_vc,_) in route_set.expand()
						{
							if forced_ports.contains(&out_port) { continue; }
							if self.faulty_outputs.contains(&out_port) { continue; }
							if self.outputs[out_port].has_credit(out_vc)
							{
								let target : &mut Box<dyn Allocator> = if self.speculative==2 { self.spec_sw_allocator.as_mut().unwrap() } else { &mut self.sw_allocator };
								target.add_request(AllocRequest{ input:q, output:out_port, label:vc as u64, in_pri:pri, out_pri:pri });
							}
						}
					},
					_ => {},
				}
			}
		}

		let nonspec_grants = self.sw_allocator.allocate(rng);
		let spec_grants = if let Some(spec) = self.spec_sw_allocator.as_mut() { spec.allocate(rng) } else { Vec::new() };
		let accepted_spec = if self.speculative==2 { self.filter_spec(spec_grants, &nonspec_grants) } else { spec_grants };

		let mut transits = Vec::new();
		for (q,vc,out_port,out_vc) in forced
		{
			self.commit_switch_grant(q,vc,out_port,out_vc,freed_credits,&mut transits);
		}
		for g in nonspec_grants
		{
			let in_vc = g.label as usize;
			if let Some((out_port,out_vc)) = self.inputs[g.input].output(in_vc)
			{
				self.commit_switch_grant(g.input,in_vc,out_port,out_vc,freed_credits,&mut transits);
				self.activity.switch_allocations += 1;
			}
		}
		for g in accepted_spec
		{
			let in_vc = g.label as usize;
			// P7: a speculative SA grant whose VA bid failed this cycle is discarded.
			if self.inputs[g.input].state(in_vc) != VcState::VcSpecGrant { continue; }
			if let Some((out_port,out_vc)) = self.inputs[g.input].output(in_vc)
			{
				self.commit_switch_grant(g.input,in_vc,out_port,out_vc,freed_credits,&mut transits);
				self.activity.speculative_allocations += 1;
			}
		}
		transits
	}

	fn filter_spec(&self, spec_grants:Vec<Grant>, nonspec_grants:&[Grant]) -> Vec<Grant>
	{
		let surviving : Vec<Grant> = match self.filter_spec_grants
		{
			FilterSpecGrants::AnyNonspecGnts => if nonspec_grants.is_empty() { spec_grants } else { Vec::new() },
			FilterSpecGrants::ConflNonspecReqs => spec_grants.into_iter()
				.filter(|g| !(0..self.num_inputs).any(|i|self.sw_allocator.read_request(i,g.output)))
				.collect(),
			FilterSpecGrants::ConflNonspecGnts => spec_grants.into_iter()
				.filter(|g| nonspec_grants.iter().all(|ng|ng.output != g.output))
				.collect(),
		};
		// A physical input port can only ever do one thing per cycle, regardless of which
		// filter rule is configured.
		surviving.into_iter().filter(|g|nonspec_grants.iter().all(|ng|ng.input != g.input)).collect()
	}

	/// Moves the granted flit from its input VC into the crossbar pipeline, updates the
	/// downstream `BufferState`, and maintains `held_crossbar`.
	fn commit_switch_grant(&mut self, q:usize, in_vc:usize, out_port:usize, out_vc:usize, freed_credits:&mut HashMap<usize,Vec<usize>>, transits:&mut Vec<CrossbarTransit>)
	{
		let mut flit = match self.inputs[q].remove_flit(in_vc) { Some(f)=>f, None=>return };
		self.activity.buffer_pops += 1;
		let is_tail = flit.tail;
		self.outputs[out_port].sending_flit(out_vc, is_tail);
		freed_credits.entry(q).or_default().push(in_vc);
		flit.vc = out_vc;
		flit.hops += 1;
		transits.push(CrossbarTransit{ out_port, flit });

		if is_tail
		{
			self.inputs[q].set_state(in_vc, VcState::Idle);
			self.held_crossbar.remove(&(q,in_vc));
		}
		else
		{
			if self.inputs[q].state(in_vc)==VcState::VcSpecGrant { self.inputs[q].set_state(in_vc, VcState::Active); }
			if self.hold_switch_for_packet { self.held_crossbar.insert((q,in_vc),(out_port,out_vc)); }
			if self.inputs[q].empty(in_vc) { self.held_crossbar.remove(&(q,in_vc)); }
		}
	}

	/// Step 5: advances the crossbar FIFO by one slot; transits that land this cycle fill
	/// the per-output departure buffer for `write_outputs`.
	fn step_switch_traversal(&mut self, transits:Vec<CrossbarTransit>)
	{
		self.crossbar_pipeline.send(if transits.is_empty() { None } else { Some(transits) });
		if let Some(landed) = self.crossbar_pipeline.receive()
		{
			for t in landed { self.departure[t.out_port] = Some(t.flit); }
		}
	}

	/// Step 6: advances the per-input credit-return FIFO by one slot.
	fn step_credit_return(&mut self, freed_credits:HashMap<usize,Vec<usize>>)
	{
		for q in 0..self.num_inputs
		{
			let credit = freed_credits.get(&q).map(|vcs|Credit{ vcs:vcs.clone(), ..Credit::default() });
			self.credit_pipeline[q].send(credit);
			self.credit_departure[q] = self.credit_pipeline[q].receive();
		}
	}
}

impl std::fmt::Debug for Router
{
	fn fmt(&self, f:&mut std::fmt::Formatter) -> std::fmt::Result
	{
		write!(f,"Router{{ index: {}, num_inputs: {}, num_outputs: {}, num_vcs: {} }}", self.index, self.num_inputs, self.num_outputs, self.num_vcs)
	}
}
