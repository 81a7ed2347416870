//! Kernel DECT socket glue
//!
//! The kernel exposes the DECT transports through its own address family:
//! the S SAP carries NWK-layer signaling with datagram semantics, the LU1
//! SAP carries per-call U-plane data with stream semantics. Sockets are
//! opened non-blocking and handed to the application's event loop; the
//! library itself never polls.
//!
//! The address layouts are kernel-defined and opaque to the stack beyond
//! the IPUI of the signaling peer and the ULEI selecting a call's U-plane
//! endpoint.

use std::io;
use std::os::unix::io::RawFd;

use opendect_common::{Ipui, MsgBuf};

/// DECT protocol family number.
pub const AF_DECT: libc::c_int = 38;

/// Signaling SAP protocol number.
pub const DECT_S_SAP: libc::c_int = 0;
/// LU1 U-plane SAP protocol number.
pub const DECT_LU1_SAP: libc::c_int = 2;

/// Signaling peer address: the portable identity, nibble-packed as in the
/// PORTABLE-IDENTITY IE.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SockaddrDect {
    pub family: libc::sa_family_t,
    pub ipui_bits: u8,
    pub ipui: [u8; 8],
}

impl SockaddrDect {
    fn zeroed() -> Self {
        Self {
            family: 0,
            ipui_bits: 0,
            ipui: [0; 8],
        }
    }

    /// Encodes a peer address from an IPUI.
    pub fn from_ipui(ipui: &Ipui) -> io::Result<Self> {
        let mut addr = Self {
            family: AF_DECT as libc::sa_family_t,
            ..Self::zeroed()
        };
        addr.ipui_bits = ipui
            .build(&mut addr.ipui)
            .map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;
        Ok(addr)
    }

    /// Decodes the peer IPUI.
    pub fn to_ipui(&self) -> io::Result<Ipui> {
        Ipui::parse(&self.ipui, self.ipui_bits)
            .map_err(|_| io::Error::from(io::ErrorKind::InvalidData))
    }
}

/// U-plane endpoint address, selected by the ULEI derived from the call's
/// transaction.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct SockaddrDectLu {
    pub family: libc::sa_family_t,
    pub ulei: u32,
}

/// A non-blocking kernel DECT socket.
#[derive(Debug)]
pub struct DectSocket {
    fd: RawFd,
}

impl DectSocket {
    fn open(ty: libc::c_int, protocol: libc::c_int) -> io::Result<Self> {
        let fd = unsafe { libc::socket(AF_DECT, ty | libc::SOCK_NONBLOCK, protocol) };
        if fd < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(Self { fd })
    }

    /// Opens the signaling SAP socket.
    pub fn s_sap() -> io::Result<Self> {
        Self::open(libc::SOCK_DGRAM, DECT_S_SAP)
    }

    /// Opens and connects a U-plane socket for the given endpoint.
    pub fn lu1(ulei: u32) -> io::Result<Self> {
        let socket = Self::open(libc::SOCK_STREAM, DECT_LU1_SAP)?;
        let addr = SockaddrDectLu {
            family: AF_DECT as libc::sa_family_t,
            ulei,
        };
        let ret = unsafe {
            libc::connect(
                socket.fd,
                std::ptr::addr_of!(addr).cast(),
                std::mem::size_of::<SockaddrDectLu>() as libc::socklen_t,
            )
        };
        if ret < 0 {
            let err = io::Error::last_os_error();
            if err.raw_os_error() != Some(libc::EINPROGRESS) {
                return Err(err);
            }
        }
        Ok(socket)
    }

    /// The raw descriptor for event loop registration.
    pub fn fd(&self) -> RawFd {
        self.fd
    }

    /// Sends a message on a connected socket.
    pub fn send(&self, mb: &MsgBuf) -> io::Result<usize> {
        let data = mb.slice();
        let ret = unsafe { libc::send(self.fd, data.as_ptr().cast(), data.len(), 0) };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(ret as usize)
    }

    /// Sends a signaling message to the given peer.
    pub fn send_to(&self, mb: &MsgBuf, addr: &SockaddrDect) -> io::Result<usize> {
        let data = mb.slice();
        let ret = unsafe {
            libc::sendto(
                self.fd,
                data.as_ptr().cast(),
                data.len(),
                0,
                std::ptr::addr_of!(*addr).cast(),
                std::mem::size_of::<SockaddrDect>() as libc::socklen_t,
            )
        };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(ret as usize)
    }

    /// Receives one message on a connected socket.
    pub fn recv(&self) -> io::Result<MsgBuf> {
        let mut mb = MsgBuf::new();
        let mut buf = [0u8; opendect_common::msg_buf::MSG_BUF_CAPACITY];
        let ret = unsafe { libc::recv(self.fd, buf.as_mut_ptr().cast(), buf.len(), 0) };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        mb.append(&buf[..ret as usize])
            .map_err(|_| io::Error::from(io::ErrorKind::InvalidData))?;
        Ok(mb)
    }

    /// Receives one signaling message, returning the peer address.
    pub fn recv_from(&self) -> io::Result<(MsgBuf, SockaddrDect)> {
        let mut mb = MsgBuf::new();
        let mut buf = [0u8; opendect_common::msg_buf::MSG_BUF_CAPACITY];
        let mut addr = SockaddrDect::zeroed();
        let mut addr_len = std::mem::size_of::<SockaddrDect>() as libc::socklen_t;
        let ret = unsafe {
            libc::recvfrom(
                self.fd,
                buf.as_mut_ptr().cast(),
                buf.len(),
                0,
                std::ptr::addr_of_mut!(addr).cast(),
                &mut addr_len,
            )
        };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }
        mb.append(&buf[..ret as usize])
            .map_err(|_| io::Error::from(io::ErrorKind::InvalidData))?;
        Ok((mb, addr))
    }
}

impl Drop for DectSocket {
    fn drop(&mut self) {
        unsafe {
            libc::close(self.fd);
        }
    }
}
