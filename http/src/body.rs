use std::{
    borrow::Cow,
    default::Default,
    fmt::Debug,
    fs::File,
    io::{Cursor, Error as IoError, ErrorKind as IoErrorKind, Read, Result as IoResult, Seek, SeekFrom},
};

trait ReadDebug: Read + Debug + Send {}
impl<T: Read + Debug + Send> ReadDebug for T {}

trait ReadSeekDebug: Read + Seek + Debug + Send {}
impl<T: Read + Seek + Debug + Send> ReadSeekDebug for T {}

/// 重置输入流接口
///
/// 重试请求前需要将请求体重置到起始位置
pub trait Reset {
    /// 重置输入流
    fn reset(&mut self) -> IoResult<()>;
}

impl<T: AsRef<[u8]>> Reset for Cursor<T> {
    #[inline]
    fn reset(&mut self) -> IoResult<()> {
        self.set_position(0);
        Ok(())
    }
}

impl Reset for File {
    #[inline]
    fn reset(&mut self) -> IoResult<()> {
        self.rewind()
    }
}

/// HTTP 请求体
///
/// 内存数据与可寻址的输入流可以被重置后重放，不可寻址的输入流只能发送一次
#[derive(Debug)]
pub struct SyncRequestBody<'a>(SyncRequestBodyInner<'a>);

#[derive(Debug)]
enum SyncRequestBodyInner<'a> {
    Bytes(Cursor<Cow<'a, [u8]>>),
    SeekableReader {
        reader: Box<dyn ReadSeekDebug + 'a>,
        offset: u64,
        size: u64,
    },
    UnseekableReader(Box<dyn ReadDebug + 'a>),
}

impl<'a> SyncRequestBody<'a> {
    /// 使用二进制数据创建请求体
    #[inline]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(SyncRequestBodyInner::Bytes(Cursor::new(Cow::Owned(bytes))))
    }

    /// 使用二进制数据的引用创建请求体
    #[inline]
    pub fn from_referenced_bytes(bytes: &'a [u8]) -> Self {
        Self(SyncRequestBodyInner::Bytes(Cursor::new(Cow::Borrowed(bytes))))
    }

    /// 使用可寻址的输入流创建请求体
    ///
    /// 请求体从输入流的当前位置开始，到输入流末尾结束
    pub fn from_seekable_reader(mut reader: impl Read + Seek + Debug + Send + 'a) -> IoResult<Self> {
        let offset = reader.stream_position()?;
        let end = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(offset))?;
        Ok(Self(SyncRequestBodyInner::SeekableReader {
            reader: Box::new(reader),
            offset,
            size: end.saturating_sub(offset),
        }))
    }

    /// 使用不可寻址的输入流创建请求体
    ///
    /// 该请求体无法重置，因此包含该请求体的请求不会被重试
    #[inline]
    pub fn from_reader(reader: impl Read + Debug + Send + 'a) -> Self {
        Self(SyncRequestBodyInner::UnseekableReader(Box::new(reader)))
    }

    /// 获取请求体大小
    ///
    /// 不可寻址的输入流返回 [`None`]
    #[inline]
    pub fn size(&self) -> Option<u64> {
        match &self.0 {
            SyncRequestBodyInner::Bytes(bytes) => Some(bytes.get_ref().len() as u64),
            SyncRequestBodyInner::SeekableReader { size, .. } => Some(*size),
            SyncRequestBodyInner::UnseekableReader(_) => None,
        }
    }

    /// 请求体是否可以被重置后重放
    #[inline]
    pub fn is_resettable(&self) -> bool {
        !matches!(&self.0, SyncRequestBodyInner::UnseekableReader(_))
    }
}

impl Default for SyncRequestBody<'_> {
    #[inline]
    fn default() -> Self {
        Self::from_bytes(Default::default())
    }
}

impl Read for SyncRequestBody<'_> {
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        match &mut self.0 {
            SyncRequestBodyInner::Bytes(bytes) => bytes.read(buf),
            SyncRequestBodyInner::SeekableReader { reader, .. } => reader.read(buf),
            SyncRequestBodyInner::UnseekableReader(reader) => reader.read(buf),
        }
    }
}

impl Reset for SyncRequestBody<'_> {
    fn reset(&mut self) -> IoResult<()> {
        match &mut self.0 {
            SyncRequestBodyInner::Bytes(bytes) => bytes.reset(),
            SyncRequestBodyInner::SeekableReader { reader, offset, .. } => {
                reader.seek(SeekFrom::Start(*offset)).map(|_| ())
            }
            SyncRequestBodyInner::UnseekableReader(_) => Err(IoError::new(
                IoErrorKind::Unsupported,
                "unseekable request body can not be reset",
            )),
        }
    }
}

/// HTTP 响应体
#[derive(Debug)]
pub struct SyncResponseBody(SyncResponseBodyInner);

#[derive(Debug)]
enum SyncResponseBodyInner {
    Reader(Box<dyn ReadDebug>),
    Bytes(Cursor<Vec<u8>>),
}

impl SyncResponseBody {
    /// 使用输入流创建响应体
    #[inline]
    pub fn from_reader(reader: impl Read + Debug + Send + 'static) -> Self {
        Self(SyncResponseBodyInner::Reader(Box::new(reader)))
    }

    /// 使用二进制数据创建响应体
    #[inline]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(SyncResponseBodyInner::Bytes(Cursor::new(bytes)))
    }
}

impl Default for SyncResponseBody {
    #[inline]
    fn default() -> Self {
        Self::from_bytes(Default::default())
    }
}

impl Read for SyncResponseBody {
    fn read(&mut self, buf: &mut [u8]) -> IoResult<usize> {
        match &mut self.0 {
            SyncResponseBodyInner::Reader(reader) => reader.read(buf),
            SyncResponseBodyInner::Bytes(bytes) => bytes.read(buf),
        }
    }
}
