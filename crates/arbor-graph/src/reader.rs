use std::io::{self, Read, Seek, SeekFrom};

use arbor_types::BLOCK_SIZE;

use crate::error::GraphResult;
use crate::node::Node;

/// Sequential and random-access reads over a file's committed blocks.
///
/// The size is captured when the reader is created. Reads stop at that
/// size; unbound offsets and the unwritten tail of a short block read as
/// zeros. The most recently used block is cached.
#[derive(Debug)]
pub struct NodeReader {
    node: Node,
    size: u64,
    pos: u64,
    cached: Option<(u64, Vec<u8>)>,
}

impl NodeReader {
    pub(crate) fn new(node: Node) -> GraphResult<Self> {
        let size = node.size()?;
        Ok(Self {
            node,
            size,
            pos: 0,
            cached: None,
        })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    fn block(&mut self, offset: u64) -> io::Result<&[u8]> {
        if self.cached.as_ref().map(|(o, _)| *o) != Some(offset) {
            let data = self
                .node
                .read_block(offset)
                .map_err(io::Error::other)?
                .unwrap_or_default();
            self.cached = Some((offset, data));
        }
        Ok(self.cached.as_ref().map(|(_, d)| d.as_slice()).unwrap_or_default())
    }
}

impl Read for NodeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() || self.pos >= self.size {
            return Ok(0);
        }
        let block_start = self.pos - self.pos % BLOCK_SIZE;
        let within = (self.pos - block_start) as usize;
        let block_end = (block_start + BLOCK_SIZE).min(self.size);
        let n = buf.len().min((block_end - self.pos) as usize);

        let data = self.block(block_start)?;
        let avail = data.get(within..).unwrap_or_default();
        let stored = avail.len().min(n);
        buf[..stored].copy_from_slice(&avail[..stored]);
        buf[stored..n].fill(0);

        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for NodeReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(delta) => self.size.checked_add_signed(delta),
            SeekFrom::Current(delta) => self.pos.checked_add_signed(delta),
        };
        let target = target.ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "seek before start of node")
        })?;
        self.pos = target;
        Ok(target)
    }
}
