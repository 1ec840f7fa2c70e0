//! Reconstruct buffers and C strings from word-at-a-time reads of tracee memory.
//!
//! `ptrace(2)` can only transfer one machine word per request, so every read here
//! is a sequence of word reads at consecutive word-aligned offsets from the start
//! address. Bytes are taken from each word in little-endian order. A failed word
//! read aborts the whole operation: callers see either the complete result or an
//! error, never a truncated one.

use std::ffi::OsString;
use std::mem::size_of;
use std::os::unix::ffi::OsStringExt;

use crate::channel::{Addr, Word, WORD_SIZE};
use crate::error::{Error, Result};

/// Source of word-sized reads from a remote address space.
pub trait PeekWord {
    fn peek_word(&self, addr: Addr) -> Result<Word>;
}

/// Read exactly `len` bytes starting at `addr`.
pub fn read_bytes<P>(mem: &P, addr: Addr, len: usize) -> Result<Vec<u8>>
where
    P: PeekWord + ?Sized,
{
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|source| Error::OutOfMemory { len, source })?;

    let mut addr = addr;

    while data.len() < len {
        let word = mem.peek_word(addr)?;

        // Only the leading bytes of the final word, if partial.
        let count = (len - data.len()).min(WORD_SIZE);
        data.extend_from_slice(&word.to_le_bytes()[..count]);

        if data.len() < len {
            addr = next_word(addr)?;
        }
    }

    Ok(data)
}

/// Read the NUL-terminated string at `addr`, without its terminator.
///
/// The string is first scanned for its terminator, then read in one pass.
pub fn read_cstring<P>(mem: &P, addr: Addr) -> Result<OsString>
where
    P: PeekWord + ?Sized,
{
    let len = cstring_len(mem, addr)?;

    let mut bytes = read_bytes(mem, addr, len + 1)?;
    bytes.truncate(len);

    Ok(OsString::from_vec(bytes))
}

/// Read the NULL-terminated array of string pointers at `addr`, as for `argv`.
pub fn read_cstring_vector<P>(mem: &P, addr: Addr) -> Result<Vec<OsString>>
where
    P: PeekWord + ?Sized,
{
    let mut strings: Vec<OsString> = vec![];
    let mut addr = addr;

    loop {
        let ptr = mem.peek_word(addr)?;

        if ptr == 0 {
            break;
        }

        strings.try_reserve(1)
            .map_err(|source| Error::OutOfMemory { len: size_of::<OsString>(), source })?;
        strings.push(read_cstring(mem, ptr as Addr)?);

        addr = next_word(addr)?;
    }

    Ok(strings)
}

// Count the bytes before the first NUL at or after `addr`.
fn cstring_len<P>(mem: &P, addr: Addr) -> Result<usize>
where
    P: PeekWord + ?Sized,
{
    let mut len = 0;
    let mut addr = addr;

    loop {
        let word = mem.peek_word(addr)?;

        if let Some(i) = word.to_le_bytes().iter().position(|&b| b == 0) {
            return Ok(len + i);
        }

        len += WORD_SIZE;
        addr = next_word(addr)?;
    }
}

fn next_word(addr: Addr) -> Result<Addr> {
    addr.checked_add(WORD_SIZE)
        .ok_or(Error::AddressOverflow { addr })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;

    use nix::errno::Errno;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::channel::Request;
    use crate::Pid;

    /// Simulated tracee memory, readable only one word at a time.
    #[derive(Default)]
    struct WordMemory {
        bytes: BTreeMap<Addr, u8>,
        peeks: RefCell<Vec<Addr>>,
    }

    impl WordMemory {
        fn write(&mut self, addr: Addr, data: &[u8]) {
            for (i, &b) in data.iter().enumerate() {
                self.bytes.insert(addr + i, b);
            }
        }

        fn write_word(&mut self, addr: Addr, word: Word) {
            self.write(addr, &word.to_le_bytes());
        }

        fn peeks(&self) -> Vec<Addr> {
            self.peeks.borrow().clone()
        }
    }

    impl PeekWord for WordMemory {
        fn peek_word(&self, addr: Addr) -> Result<Word> {
            self.peeks.borrow_mut().push(addr);

            let mut bytes = [0u8; WORD_SIZE];

            for (i, b) in bytes.iter_mut().enumerate() {
                *b = *self.bytes.get(&(addr + i)).ok_or(Error::Request {
                    pid: Pid::from_raw(1),
                    request: Request::PTRACE_PEEKDATA,
                    source: Errno::EIO,
                })?;
            }

            Ok(Word::from_le_bytes(bytes))
        }
    }

    const BASE: Addr = 0x1000;

    #[test]
    fn test_read_bytes_all_lengths() {
        let content: Vec<u8> = (1..=(4 * WORD_SIZE as u8 + 3)).collect();

        let mut mem = WordMemory::default();
        mem.write(BASE, &content);
        // Pad the final word so trailing reads stay mapped.
        mem.write(BASE + content.len(), &[0xaa; WORD_SIZE]);

        for len in 0..=content.len() {
            let data = read_bytes(&mem, BASE, len).unwrap();
            assert_eq!(data, &content[..len]);
        }
    }

    #[test]
    fn test_read_bytes_word_count() {
        let mut mem = WordMemory::default();
        mem.write(BASE, &[7; 3 * WORD_SIZE]);

        read_bytes(&mem, BASE, 2 * WORD_SIZE + 1).unwrap();

        assert_eq!(mem.peeks(), vec![BASE, BASE + WORD_SIZE, BASE + 2 * WORD_SIZE]);
    }

    #[test]
    fn test_read_bytes_empty() {
        let mem = WordMemory::default();

        assert!(read_bytes(&mem, BASE, 0).unwrap().is_empty());
        assert!(mem.peeks().is_empty());
    }

    #[test]
    fn test_read_bytes_fails_without_partial_data() {
        let mut mem = WordMemory::default();
        mem.write(BASE, &[1; WORD_SIZE]);

        let err = read_bytes(&mem, BASE, 2 * WORD_SIZE).unwrap_err();

        assert_eq!(err.errno(), Some(Errno::EIO));
    }

    #[test]
    fn test_read_bytes_out_of_memory() {
        let mem = WordMemory::default();

        let err = read_bytes(&mem, BASE, usize::MAX).unwrap_err();

        assert!(matches!(err, Error::OutOfMemory { len: usize::MAX, .. }));
        assert!(mem.peeks().is_empty());
    }

    #[test]
    fn test_read_cstring_short() {
        let mut mem = WordMemory::default();
        mem.write(BASE, b"hi\0");
        mem.write(BASE + 3, &[0x55; 2 * WORD_SIZE]);

        assert_eq!(read_cstring(&mem, BASE).unwrap(), "hi");
    }

    #[test]
    fn test_read_cstring_terminator_at_every_offset() {
        for len in 0..(3 * WORD_SIZE) {
            let mut mem = WordMemory::default();
            let text: Vec<u8> = (0..len).map(|i| b'a' + (i % 26) as u8).collect();

            mem.write(BASE, &text);
            mem.write(BASE + len, &[0]);
            mem.write(BASE + len + 1, &[b'z'; 2 * WORD_SIZE]);

            let s = read_cstring(&mem, BASE).unwrap();
            assert_eq!(s.into_vec(), text);
        }
    }

    #[test]
    fn test_read_cstring_word_multiple() {
        // No terminator in the first words: it begins the next one.
        let text = vec![b'x'; 2 * WORD_SIZE];

        let mut mem = WordMemory::default();
        mem.write(BASE, &text);
        mem.write_word(BASE + text.len(), 0);

        let s = read_cstring(&mem, BASE).unwrap();

        assert_eq!(s.into_vec(), text);
    }

    #[test]
    fn test_read_cstring_empty() {
        let mut mem = WordMemory::default();
        mem.write_word(BASE, 0);

        assert_eq!(read_cstring(&mem, BASE).unwrap(), "");
    }

    #[test]
    fn test_read_cstring_unterminated_fails() {
        let mut mem = WordMemory::default();
        mem.write(BASE, &[b'q'; 4 * WORD_SIZE]);

        let err = read_cstring(&mem, BASE).unwrap_err();

        assert_eq!(err.errno(), Some(Errno::EIO));
        assert_eq!(mem.peeks().last(), Some(&(BASE + 4 * WORD_SIZE)));
    }

    #[test]
    fn test_read_cstring_not_utf8() {
        let mut mem = WordMemory::default();
        mem.write(BASE, &[0xff, 0xfe, 0x00]);
        mem.write(BASE + 3, &[0; WORD_SIZE]);

        let s = read_cstring(&mem, BASE).unwrap();

        assert_eq!(s.into_vec(), vec![0xff, 0xfe]);
    }

    #[test]
    fn test_read_cstring_vector() {
        let first = 0x2000;
        let second = 0x3000;

        let mut mem = WordMemory::default();
        mem.write_word(BASE, first as Word);
        mem.write_word(BASE + WORD_SIZE, second as Word);
        mem.write_word(BASE + 2 * WORD_SIZE, 0);
        mem.write(first, b"/bin/echo\0\0\0\0\0\0\0\0");
        mem.write(second, b"hello\0\0\0\0\0\0\0\0");

        let strings = read_cstring_vector(&mem, BASE).unwrap();

        assert_eq!(strings, vec![OsString::from("/bin/echo"), OsString::from("hello")]);
    }

    #[test]
    fn test_read_cstring_vector_grows_past_initial_capacity() {
        const ENTRIES: usize = 100;
        let strings_base = 0x8000;

        let mut mem = WordMemory::default();

        for i in 0..ENTRIES {
            let ptr = strings_base + i * 2 * WORD_SIZE;
            mem.write(ptr, &[0; 2 * WORD_SIZE]);
            mem.write(ptr, i.to_string().as_bytes());
            mem.write_word(BASE + i * WORD_SIZE, ptr as Word);
        }
        mem.write_word(BASE + ENTRIES * WORD_SIZE, 0);

        let strings = read_cstring_vector(&mem, BASE).unwrap();

        let expected: Vec<OsString> = (0..ENTRIES).map(|i| i.to_string().into()).collect();
        assert_eq!(strings, expected);
    }

    #[test]
    fn test_read_cstring_vector_stops_at_null() {
        let mut mem = WordMemory::default();
        mem.write_word(BASE, 0);

        // Garbage pointer after the terminator must never be followed.
        mem.write_word(BASE + WORD_SIZE, 0x4000);

        let strings = read_cstring_vector(&mem, BASE).unwrap();

        assert!(strings.is_empty());
        assert_eq!(mem.peeks(), vec![BASE]);
    }

    #[test]
    fn test_read_cstring_vector_bad_entry_fails() {
        let good = 0x2000;

        let mut mem = WordMemory::default();
        mem.write_word(BASE, good as Word);
        mem.write_word(BASE + WORD_SIZE, 0x9000);
        mem.write_word(BASE + 2 * WORD_SIZE, 0);
        mem.write(good, b"ok\0\0\0\0\0\0\0\0");

        let err = read_cstring_vector(&mem, BASE).unwrap_err();

        assert_eq!(err.errno(), Some(Errno::EIO));
    }

    #[test]
    fn test_read_cstring_vector_unterminated_table_fails() {
        let good = 0x2000;

        let mut mem = WordMemory::default();
        mem.write_word(BASE, good as Word);
        mem.write(good, b"ok\0\0\0\0\0\0\0\0");

        assert!(read_cstring_vector(&mem, BASE).is_err());
    }

    #[test]
    fn test_scan_overflow() {
        let mut mem = WordMemory::default();
        let last = usize::MAX - WORD_SIZE + 1;
        mem.write(last, &[b'a'; WORD_SIZE]);

        let err = read_cstring(&mem, last).unwrap_err();

        assert!(matches!(err, Error::AddressOverflow { addr } if addr == last));
    }
}
