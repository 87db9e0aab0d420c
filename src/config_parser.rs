/*!

A small recursive-descent parser turning configuration text into `ConfigurationValue`
trees. This replaces the `gramatica`-generated grammar of the wider CAMINOS-lineage
tooling: that grammar also parses the `Experiments`/`NamedExperiments`/`Where` sweep
syntax used to describe whole batches of runs, none of which the router/allocator core
needs (see DESIGN.md for the justification of the substitution). The object/array/scalar
subset below is exactly what `ConfigurationValue` can represent.

Grammar:

```ignore
value      := object | array | number | string | "true" | "false"
object     := ident "{" (ident ":" value ",")* "}"
array      := "[" (value ",")* "]"
number     := "-"? digit+ ("." digit+)?
string     := '"' (not '"')* '"'
```
*/

use crate::config::ConfigurationValue;

#[derive(Debug)]
pub struct ParseError
{
	pub message: String,
	pub position: usize,
}

impl std::fmt::Display for ParseError
{
	fn fmt(&self, f:&mut std::fmt::Formatter) -> std::fmt::Result
	{
		write!(f,"parse error at byte {}: {}",self.position,self.message)
	}
}
impl std::error::Error for ParseError {}

pub fn parse(text:&str) -> Result<ConfigurationValue,ParseError>
{
	let mut parser = Parser{ bytes: text.as_bytes(), pos:0 };
	parser.skip_whitespace();
	let value = parser.parse_value()?;
	parser.skip_whitespace();
	if parser.pos != parser.bytes.len()
	{
		return Err(parser.error("trailing content after top-level value"));
	}
	Ok(value)
}

struct Parser<'a>
{
	bytes: &'a [u8],
	pos: usize,
}

impl<'a> Parser<'a>
{
	fn error(&self, message:&str) -> ParseError
	{
		ParseError{ message: message.to_string(), position: self.pos }
	}
	fn peek(&self) -> Option<u8>
	{
		self.bytes.get(self.pos).copied()
	}
	fn skip_whitespace(&mut self)
	{
		while let Some(c) = self.peek()
		{
			if c==b' ' || c==b'\t' || c==b'\n' || c==b'\r'
			{
				self.pos+=1;
			}
			else if c==b'/' && self.bytes.get(self.pos+1)==Some(&b'/')
			{
				while self.peek().is_some() && self.peek()!=Some(b'\n') { self.pos+=1; }
			}
			else
			{
				break;
			}
		}
	}
	fn expect(&mut self, c:u8) -> Result<(),ParseError>
	{
		if self.peek()==Some(c)
		{
			self.pos+=1;
			Ok(())
		}
		else
		{
			Err(self.error(&format!("expected `{}`",c as char)))
		}
	}
	fn parse_ident(&mut self) -> Result<String,ParseError>
	{
		let start = self.pos;
		while let Some(c) = self.peek()
		{
			if c.is_ascii_alphanumeric() || c==b'_' { self.pos+=1; } else { break; }
		}
		if self.pos==start
		{
			return Err(self.error("expected an identifier"));
		}
		Ok(String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned())
	}
	fn parse_value(&mut self) -> Result<ConfigurationValue,ParseError>
	{
		self.skip_whitespace();
		match self.peek()
		{
			Some(b'"') => self.parse_string(),
			Some(b'[') => self.parse_array(),
			Some(c) if c==b'-' || c.is_ascii_digit() => self.parse_number(),
			Some(c) if c.is_ascii_alphabetic() =>
			{
				let start = self.pos;
				let ident = self.parse_ident()?;
				self.skip_whitespace();
				if ident=="true" { return Ok(ConfigurationValue::True); }
				if ident=="false" { return Ok(ConfigurationValue::False); }
				if self.peek()==Some(b'{')
				{
					self.parse_object_body(ident)
				}
				else
				{
					self.pos = start;
					Err(self.error("expected an object (`Name{...}`) or a boolean literal"))
				}
			},
			_ => Err(self.error("expected a value")),
		}
	}
	fn parse_string(&mut self) -> Result<ConfigurationValue,ParseError>
	{
		self.expect(b'"')?;
		let start = self.pos;
		while self.peek().is_some() && self.peek()!=Some(b'"') { self.pos+=1; }
		if self.peek()!=Some(b'"')
		{
			return Err(self.error("unterminated string literal"));
		}
		let s = String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned();
		self.pos+=1;
		Ok(ConfigurationValue::Literal(s))
	}
	fn parse_number(&mut self) -> Result<ConfigurationValue,ParseError>
	{
		let start = self.pos;
		if self.peek()==Some(b'-') { self.pos+=1; }
		while self.peek().map_or(false,|c|c.is_ascii_digit()) { self.pos+=1; }
		if self.peek()==Some(b'.')
		{
			self.pos+=1;
			while self.peek().map_or(false,|c|c.is_ascii_digit()) { self.pos+=1; }
		}
		let text = std::str::from_utf8(&self.bytes[start..self.pos]).unwrap();
		let n : f64 = text.parse().map_err(|_|self.error("malformed number"))?;
		Ok(ConfigurationValue::Number(n))
	}
	fn parse_array(&mut self) -> Result<ConfigurationValue,ParseError>
	{
		self.expect(b'[')?;
		let mut items = Vec::new();
		self.skip_whitespace();
		while self.peek()!=Some(b']')
		{
			items.push(self.parse_value()?);
			self.skip_whitespace();
			if self.peek()==Some(b',')
			{
				self.pos+=1;
				self.skip_whitespace();
			}
			else
			{
				break;
			}
		}
		self.expect(b']')?;
		Ok(ConfigurationValue::Array(items))
	}
	fn parse_object_body(&mut self, name:String) -> Result<ConfigurationValue,ParseError>
	{
		self.expect(b'{')?;
		let mut pairs = Vec::new();
		self.skip_whitespace();
		while self.peek()!=Some(b'}')
		{
			let key = self.parse_ident()?;
			self.skip_whitespace();
			self.expect(b':')?;
			let value = self.parse_value()?;
			pairs.push((key,value));
			self.skip_whitespace();
			if self.peek()==Some(b',')
			{
				self.pos+=1;
				self.skip_whitespace();
			}
			else
			{
				break;
			}
		}
		self.expect(b'}')?;
		Ok(ConfigurationValue::Object(name,pairs))
	}
}
